//! Prompt texts sent with each content-generation request.
//!
//! The generation endpoints expect a `prompt` string giving the task
//! context; the title endpoint additionally takes a `desc` string with the
//! expected output format.  These texts are part of the wire contract with
//! the generation service and are kept verbatim.

/// Task context for title generation.
pub const TITLE_CONTEXT: &str = "Context: Create a nice Title for the following product \
including all keywords and help improve listing quality index";

/// Output-format example sent alongside [`TITLE_CONTEXT`].
pub const TITLE_FORMAT: &str =
    "Example: [Brand Name] - [Colour] coloured [Title] [All Keywords] with [USP].";

/// Task context for image generation.
pub const IMAGE_GENERATE_CONTEXT: &str = "Context: Generate images of the following Products";

/// Task context for image editing.
pub const IMAGE_EDIT_CONTEXT: &str = "Context: Edit the image as the following:";

/// Task context for description generation.
///
/// `concise` selects the short form used for summary fields ("short 2-3
/// points"); the long-description field omits the clause.
pub fn description_context(concise: bool) -> String {
    format!(
        "Context: Create a nice,{} detailed bulleted Description of the following product \
including all keywords and help improve listing quality index.",
        if concise { " short 2-3 points" } else { "" }
    )
}
