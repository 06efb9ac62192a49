fn main() {
    std::process::exit(adpipeline::app::startup::startup());
}
