fn main() {
    grammarkit::cli::run();
}
