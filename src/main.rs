fn main() {
    if let Err(err) = csv_rulemap::run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
