fn main() {
    if let Err(err) = survey_insight::run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
