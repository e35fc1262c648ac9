use anyhow::Context;
use std::io::{BufRead, Write};
use stockviz_core::domain::ValidationError;

/// Line-oriented question/answer over any reader and writer.
pub struct Prompter<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Prompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    pub fn say(&mut self, line: &str) -> anyhow::Result<()> {
        writeln!(self.output, "{line}").context("failed to write to terminal")
    }

    /// Prints `question` and returns the trimmed answer. End of input is an error,
    /// which is what stops the re-prompt loops when stdin closes.
    pub fn ask(&mut self, question: &str) -> anyhow::Result<String> {
        write!(self.output, "{question}").context("failed to write to terminal")?;
        self.output.flush().context("failed to flush terminal")?;

        let mut line = String::new();
        let n = self
            .input
            .read_line(&mut line)
            .context("failed to read from terminal")?;
        anyhow::ensure!(n > 0, "input closed before an answer was given");
        Ok(line.trim().to_string())
    }

    /// Asks until `parse` accepts the answer, printing the corrective message each time.
    pub fn ask_until<T>(
        &mut self,
        question: &str,
        parse: impl Fn(&str) -> Result<T, ValidationError>,
    ) -> anyhow::Result<T> {
        loop {
            let answer = self.ask(question)?;
            match parse(&answer) {
                Ok(v) => return Ok(v),
                Err(err) => self.say(&err.user_message())?,
            }
        }
    }

    #[cfg(test)]
    pub fn into_output(self) -> W {
        self.output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use stockviz_core::domain::ChartKind;

    #[test]
    fn ask_trims_answer_and_echoes_question() {
        let mut p = Prompter::new(Cursor::new("  aapl \n"), Vec::new());
        assert_eq!(p.ask("Symbol: ").unwrap(), "aapl");
        assert_eq!(String::from_utf8(p.into_output()).unwrap(), "Symbol: ");
    }

    #[test]
    fn ask_until_reprompts_on_invalid_answers() {
        let mut p = Prompter::new(Cursor::new("pie\nscatter\nbar\n"), Vec::new());
        let kind = p.ask_until("Chart: ", |s| s.parse::<ChartKind>()).unwrap();
        assert_eq!(kind, ChartKind::Bar);

        let out = String::from_utf8(p.into_output()).unwrap();
        assert_eq!(out.matches("Chart type invalid").count(), 2);
    }

    #[test]
    fn closed_input_ends_the_loop() {
        let mut p = Prompter::new(Cursor::new("pie\n"), Vec::new());
        assert!(p.ask_until("Chart: ", |s| s.parse::<ChartKind>()).is_err());
    }
}
