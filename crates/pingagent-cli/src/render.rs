use bat::WrappingMode;

const THEME: &str = "zenburn";

/// Print an answer as highlighted Markdown, or as plain text if the terminal
/// printer fails
pub fn render(content: &str) {
    let printed = bat::PrettyPrinter::new()
        .input(bat::Input::from_bytes(content.as_bytes()))
        .theme(THEME)
        .language("Markdown")
        .wrapping_mode(WrappingMode::Character)
        .print();

    match printed {
        Ok(_) => println!(),
        Err(e) => {
            tracing::debug!(error = %e, "markdown rendering failed");
            println!("{}", content);
        }
    }
}
