fn main() {
    if let Err(err) = csv_reorder::run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
