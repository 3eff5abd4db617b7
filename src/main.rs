fn main() {
    if let Err(err) = promptchip::cli::main() {
        eprintln!("❌ {err}");
        std::process::exit(1);
    }
}
