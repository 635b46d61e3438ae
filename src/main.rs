fn main() {
    if let Err(err) = dti_explorer::run() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}
