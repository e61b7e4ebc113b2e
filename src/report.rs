//! User-facing error text

use easylpac_lpa::UserFriendlyError;

/// Render an error with its context and suggestions for the terminal.
#[must_use]
pub fn display_for_user(error: &dyn UserFriendlyError) -> String {
    let mut output = format!("Error: {}\n", error.user_message());

    if let Some(ctx) = error.context() {
        output.push_str(&format!("\nContext: {ctx}\n"));
    }

    let suggestions = error.suggestions();
    if !suggestions.is_empty() {
        output.push_str("\nSuggestions:\n");
        for suggestion in suggestions {
            output.push_str(&format!("  • {suggestion}\n"));
        }
    }

    output
}
