use syntect::highlighting::{Theme, ThemeSet};
use syntect::html::{ClassStyle, ClassedHTMLGenerator, css_for_theme_with_class_style};
use syntect::parsing::{SyntaxReference, SyntaxSet};
use syntect::util::LinesWithEndings;
use thiserror::Error;

/// Class prefix shared by the generated markup and the stylesheet.
const CLASS_STYLE: ClassStyle = ClassStyle::SpacedPrefixed { prefix: "hl-" };

/// Names people type that the bundled syntax set does not resolve on its own.
const LANGUAGE_ALIASES: &[(&str, &str)] = &[
    ("c++", "cpp"),
    ("cxx", "cpp"),
    ("python3", "py"),
    ("py3", "py"),
    ("golang", "go"),
    ("shell", "sh"),
    ("bash", "sh"),
    ("zsh", "sh"),
    ("text", "txt"),
    ("plaintext", "txt"),
    ("csharp", "cs"),
    ("c#", "cs"),
    ("typescript", "ts"),
];

#[derive(Debug, Error)]
pub enum HighlightError {
    #[error("no lexer for alias '{0}' found")]
    UnknownLanguage(String),
    #[error("unknown theme '{name}' (available: {available})")]
    UnknownTheme { name: String, available: String },
    #[error(transparent)]
    Syntect(#[from] syntect::Error),
}

pub struct Highlighter {
    syntaxes: SyntaxSet,
    theme: Theme,
}

impl Highlighter {
    pub fn new(theme_name: &str) -> Result<Self, HighlightError> {
        let mut themes = ThemeSet::load_defaults().themes;
        let Some(theme) = themes.remove(theme_name) else {
            return Err(HighlightError::UnknownTheme {
                name: theme_name.to_string(),
                available: themes.keys().cloned().collect::<Vec<_>>().join(", "),
            });
        };
        Ok(Self {
            syntaxes: SyntaxSet::load_defaults_newlines(),
            theme,
        })
    }

    /// Highlighted HTML for `code`, or an error message in its place.
    pub fn highlight(&self, code: &str, language: &str) -> String {
        match self.try_highlight(code, language) {
            Ok(html) => html,
            Err(err) => {
                tracing::debug!(language, error = %err, "highlighting failed");
                format!("Error highlighting code: {err}")
            }
        }
    }

    pub fn try_highlight(&self, code: &str, language: &str) -> Result<String, HighlightError> {
        let syntax = self.find_syntax(language)?;
        let mut generator =
            ClassedHTMLGenerator::new_with_class_style(syntax, &self.syntaxes, CLASS_STYLE);
        for line in LinesWithEndings::from(code) {
            generator.parse_html_for_line_which_includes_newline(line)?;
        }
        Ok(format!(
            "<div class=\"highlight\"><pre class=\"hl-code\">{}</pre></div>",
            generator.finalize()
        ))
    }

    /// CSS for the configured theme, matching the classes `highlight` emits.
    pub fn stylesheet(&self) -> Result<String, HighlightError> {
        Ok(css_for_theme_with_class_style(&self.theme, CLASS_STYLE)?)
    }

    fn find_syntax(&self, language: &str) -> Result<&SyntaxReference, HighlightError> {
        let lowered = language.trim().to_lowercase();
        let token = LANGUAGE_ALIASES
            .iter()
            .find(|(alias, _)| *alias == lowered)
            .map(|(_, token)| *token)
            .unwrap_or(lowered.as_str());
        if token.is_empty() {
            return Err(HighlightError::UnknownLanguage(language.to_string()));
        }
        self.syntaxes
            .find_syntax_by_token(token)
            .ok_or_else(|| HighlightError::UnknownLanguage(language.to_string()))
    }
}

pub fn theme_names() -> Vec<String> {
    ThemeSet::load_defaults().themes.into_keys().collect()
}
