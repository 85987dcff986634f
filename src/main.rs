fn main() -> std::process::ExitCode {
    ocr_extract_lib::run()
}
