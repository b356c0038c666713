fn main() {
    if let Err(err) = tabular_view::run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
