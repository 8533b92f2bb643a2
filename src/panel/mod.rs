//! Displays panel: the command layer over the display tree

mod displays_panel;
mod prompts;

pub use displays_panel::{with_group_extension, CommandOutcome, DisplaysPanel};
pub use prompts::{NewDisplayChoice, PanelPrompts, ScriptedPrompts, TopicChoice};
