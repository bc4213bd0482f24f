fn main() {
    if let Err(err) = csv_canon::run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
