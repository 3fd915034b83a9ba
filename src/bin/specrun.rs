fn main() {
    specrun::cli::run();
}
