fn main() {
    if let Err(err) = realty_insight::run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
