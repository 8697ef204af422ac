fn main() {
    if let Err(err) = datalink_ingest::run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
