//! Producer to consumer handoff: mailbox, render loop, and frame session

pub mod mailbox;
pub mod render_loop;
pub mod renderer;
pub mod session;

pub use mailbox::{FrameMailbox, MailboxStats};
pub use render_loop::{RenderLoop, RenderStats};
pub use renderer::FrameRenderer;
pub use session::FrameSession;
