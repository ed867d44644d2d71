fn main() {
    std::process::exit(sutra_check::cli::run());
}
