fn main() {
    aoi::cli::run();
}
