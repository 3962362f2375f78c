//! Deckhand - Run build, test and deploy stages in order.
//!
//! # Architecture
//!
//! ```text
//! src/
//! ├── cli/              # Command-line interface
//! │   ├── init          # Write the default pipeline
//! │   ├── run           # Execute the pipeline
//! │   ├── plan          # Dry-run: what would execute or skip
//! │   ├── check         # Programs, secrets and env preflight
//! │   ├── env           # Masked view of an environment set
//! │   └── output        # Shared terminal formatting
//! └── core/             # Core library components
//!     ├── config        # .deckhand.toml management
//!     ├── env           # Environment sets per context
//!     ├── secrets       # Secret resolution and scoping
//!     ├── readiness     # Bounded service readiness polling
//!     ├── stage         # Stages and shell actions
//!     ├── sequencer     # Fail-fast, branch-gated stage runner
//!     ├── report        # Run and stage outcomes
//!     ├── trigger       # Triggering branch resolution
//!     └── shell         # Platform shell invocation
//! ```
//!
//! # Behavior
//!
//! - Stages run strictly in order; the first blocking failure stops the run
//! - Gated stages (deploy) run only on the designated branch; skipping is not a failure
//! - Stages can wait on services through a bounded readiness probe
//! - Each stage sees only the secrets it declares

pub mod cli;
pub mod core;
pub mod error;
