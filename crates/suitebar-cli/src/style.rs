use console::Style;

pub fn error_prefix() -> String {
    Style::new()
        .for_stderr()
        .red()
        .bold()
        .apply_to("error:")
        .to_string()
}
