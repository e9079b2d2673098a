//! # Payment Methods
//!
//! A client-side payment method registry: a working list synchronized
//! from an externally owned source, a polymorphic add/edit form, and the
//! field normalization between raw keystrokes and stored records.
//!
//! ## Design Principles
//!
//! - **Single-default invariant**: every non-empty rendered list has
//!   exactly one default method
//! - **Tagged union records**: only the fields meaningful for a method's
//!   kind can exist
//! - **Total input handling**: malformed field input degrades to absent
//!   derived fields, never to a rejected submission
//! - **Fire-and-forget notifications**: collaborators are told after
//!   local mutations and can neither block nor roll them back
//!
//! ## Example
//!
//! ```no_run
//! use payment_methods::{MethodConsole, MethodType};
//!
//! let mut console = MethodConsole::new();
//! console.open_add(MethodType::CreditCard);
//! if let Some(form) = console.form_mut() {
//!     form.set_card_number("4111 1111 1111 1111");
//!     form.set_expiration("0729");
//! }
//! let added = console.submit().unwrap();
//! assert!(added.is_default);
//! ```

pub mod console;
pub mod editor;
pub mod error;
pub mod method;
pub mod normalize;
pub mod ops;
pub mod registry;

pub use console::MethodConsole;
pub use editor::{EditorState, MethodFormState};
pub use error::{ConsoleError, Result};
pub use method::{MethodKind, MethodType, PaymentMethod};
pub use normalize::{display_label, Expiration};
pub use ops::{FieldInput, Op, OpRecord};
pub use registry::{MethodEvents, MethodRegistry, NullEvents};
