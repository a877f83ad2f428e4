//! # CLI Module
//!
//! The command-line layer of spyt. Every command loads what it needs (the
//! cached sessions, the clients from [`crate::server::AppState`]), calls into
//! the Spotify/YouTube clients or the [`crate::export::Exporter`], and renders
//! the outcome.
//!
//! ## Commands
//!
//! ### Authentication
//!
//! - [`auth`] - sign in to Spotify or YouTube through the browser. The local
//!   server receives the OAuth callback and the session is cached on disk.
//! - [`logout`] - forget the cached session of one or both services.
//!
//! ### Playlists
//!
//! - [`playlists`] - list the Spotify playlists (one page or all of them), as a
//!   table or JSON, optionally saved to a file.
//! - [`export`] - copy selected playlists to YouTube with a progress bar per
//!   playlist and a summary table at the end.
//!
//! ### Server
//!
//! - [`serve`] - run the HTTP API in the foreground.
//!
//! ## Error Presentation
//!
//! Commands report problems with the `info!`/`success!`/`warning!`/`error!`
//! macros. `error!` ends the process, so it is reserved for failures that leave
//! nothing useful to show. An export distinguishes three outcomes:
//!
//! - YouTube is not connected: a warning with the command to fix it
//! - the run could not start (Spotify listing failed, rate limit): an error with
//!   a retry hint
//! - some playlists or tracks failed: the summary table lists them
//!
//! ## Usage
//!
//! ```bash
//! spyt auth spotify
//! spyt auth youtube
//! spyt playlists --all
//! spyt export 37i9dQZF1DXcBWIGoYBM5M 5ABHKGoOzxkaa28ttQV9sE
//! spyt logout all
//! ```

mod auth;
mod export;
mod logout;
mod playlists;
mod serve;

pub use auth::auth;
pub use export::export;
pub use logout::LogoutTarget;
pub use logout::logout;
pub use playlists::ListOptions;
pub use playlists::playlists;
pub use serve::serve;
