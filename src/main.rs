fn main() {
    typegraph::projects::cli::start_cli();
}
