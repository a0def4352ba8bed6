//! Sequential orchestration of one search, suggest, fetch, answer cycle.
//!
//! Remote failures never abort the run: a failed search reads as an empty
//! result, a failed fetch contributes an empty document, and a failed
//! completion is rendered as descriptive answer text. The orchestrator is
//! generic over its console streams so the whole flow runs against buffers
//! in tests.

use crate::completion::{self, CompletionClient, CompletionError};
use crate::config::Config;
use crate::confluence::{ConfluenceClient, ConfluenceError, SearchResult};
use crate::sanitize::DocumentContent;
use crate::suggest;
use std::io::{BufRead, Write};

/// Question substituted when a numeric selection is out of range.
pub const DEFAULT_QUESTION: &str = "Please provide more details about this topic";

/// Outcome of interpreting the user's question selection.
#[derive(Debug, PartialEq, Eq)]
pub enum QuestionChoice {
    /// A suggestion picked by its 1-based index.
    Suggested(String),
    /// A numeric selection outside the suggestion range.
    OutOfRange,
    /// Free text typed by the user, taken verbatim.
    Custom(String),
}

/// Interpret a selection line against the suggestion list.
///
/// Digits select 1-based; indices of 0 or past the end are out of range
/// rather than errors. Anything non-numeric is the question itself.
pub fn select_question(choice: &str, suggestions: &[String]) -> QuestionChoice {
    if let Ok(index) = choice.parse::<usize>() {
        if (1..=suggestions.len()).contains(&index) {
            return QuestionChoice::Suggested(suggestions[index - 1].clone());
        }
        return QuestionChoice::OutOfRange;
    }
    QuestionChoice::Custom(choice.to_string())
}

/// One-shot interactive question-answering pipeline.
pub struct Pipeline {
    confluence: ConfluenceClient,
    completion: Box<dyn CompletionClient>,
}

impl Pipeline {
    /// Construct the pipeline and its remote clients from configuration.
    pub fn new(config: &Config) -> Result<Self, ConfluenceError> {
        Ok(Self {
            confluence: ConfluenceClient::new(config)?,
            completion: completion::get_completion_client(config),
        })
    }

    /// Run one search, question, answer cycle over the given console streams.
    ///
    /// Always terminates after a single cycle; the only errors that
    /// propagate are console I/O failures.
    pub async fn run(
        &self,
        input: &mut impl BufRead,
        output: &mut impl Write,
    ) -> std::io::Result<()> {
        write!(output, "Enter search term: ")?;
        output.flush()?;
        let term = read_line(input)?;

        let pages = match self.confluence.search(&term).await {
            Ok(pages) => pages,
            Err(error) => {
                tracing::error!(query = %term, error = %error, "Search failed");
                Vec::new()
            }
        };

        if pages.is_empty() {
            writeln!(output, "No pages found!")?;
            return Ok(());
        }

        writeln!(output, "\nFound {} relevant pages:", pages.len())?;
        for (index, page) in pages.iter().enumerate() {
            writeln!(output, "{}. {}", index + 1, page.title)?;
        }

        let titles: Vec<String> = pages.iter().map(|page| page.title.clone()).collect();
        let questions = suggest::suggest_questions(&titles);

        writeln!(output, "\nSuggested questions based on found pages:")?;
        for (index, question) in questions.iter().enumerate() {
            writeln!(output, "{}. {}", index + 1, question)?;
        }

        writeln!(output, "\nChoose a question number or enter your own question:")?;
        write!(output, "Enter question number or type your question: ")?;
        output.flush()?;
        let choice = read_line(input)?;

        let question = match select_question(&choice, &questions) {
            QuestionChoice::Suggested(question) => question,
            QuestionChoice::OutOfRange => {
                writeln!(output, "Invalid question number. Using default question.")?;
                DEFAULT_QUESTION.to_string()
            }
            QuestionChoice::Custom(question) => question,
        };

        let contents = self.fetch_all(&pages).await;
        let context = contents
            .iter()
            .map(|document| document.text.as_str())
            .collect::<Vec<_>>()
            .join("\n\n");

        let answer = match self.completion.complete(&question, &context).await {
            Ok(answer) => answer,
            Err(error) => describe_completion_error(&error),
        };

        writeln!(output, "\nAnswer: {answer}")?;
        Ok(())
    }

    /// Fetch every page body in result order.
    ///
    /// A failed fetch yields an empty document in its slot; the remaining
    /// pages still contribute, and order is preserved.
    async fn fetch_all(&self, pages: &[SearchResult]) -> Vec<DocumentContent> {
        let mut contents = Vec::with_capacity(pages.len());
        for page in pages {
            match self.confluence.fetch(&page.id).await {
                Ok(document) => contents.push(document),
                Err(error) => {
                    tracing::error!(page = %page.id, error = %error, "Content fetch failed");
                    contents.push(DocumentContent::empty());
                }
            }
        }
        contents
    }
}

/// Render a completion failure as answer text instead of propagating it.
fn describe_completion_error(error: &CompletionError) -> String {
    format!("AI error: {error}")
}

fn read_line(input: &mut impl BufRead) -> std::io::Result<String> {
    let mut line = String::new();
    input.read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn suggestions(count: usize) -> Vec<String> {
        (1..=count).map(|index| format!("question {index}")).collect()
    }

    #[test]
    fn numeric_choice_selects_one_based() {
        let list = suggestions(3);
        assert_eq!(
            select_question("1", &list),
            QuestionChoice::Suggested("question 1".to_string())
        );
        assert_eq!(
            select_question("3", &list),
            QuestionChoice::Suggested("question 3".to_string())
        );
    }

    #[test]
    fn zero_and_overflow_are_out_of_range() {
        let list = suggestions(3);
        assert_eq!(select_question("0", &list), QuestionChoice::OutOfRange);
        assert_eq!(select_question("4", &list), QuestionChoice::OutOfRange);
    }

    #[test]
    fn free_text_is_taken_verbatim() {
        let list = suggestions(2);
        assert_eq!(
            select_question("How does bucketing work?", &list),
            QuestionChoice::Custom("How does bucketing work?".to_string())
        );
        // Negative numbers and padded digits read as text, not selections.
        assert_eq!(
            select_question("-1", &list),
            QuestionChoice::Custom("-1".to_string())
        );
        assert_eq!(
            select_question(" 2", &list),
            QuestionChoice::Custom(" 2".to_string())
        );
    }

    #[test]
    fn completion_errors_render_as_text() {
        let error = CompletionError::InvalidResponse("bad payload".to_string());
        assert_eq!(
            describe_completion_error(&error),
            "AI error: Malformed completion response: bad payload"
        );
    }
}
