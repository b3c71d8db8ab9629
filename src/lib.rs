//! Rekey - a four-step credential rotation handler for vault-managed secrets.
//!
//! An external orchestrator invokes the handler at discrete lifecycle steps
//! (`createSecret`, `setSecret`, `testSecret`, `finishSecret`) and rekey drives
//! the stored secret through the rotation protocol without ever leaving it in
//! a partially-rotated state, even across retries, crashes between steps, or
//! concurrent invocations.
//!
//! # Architecture
//!
//! ```text
//! src/
//! ├── error           # Error taxonomy shared across the crate
//! └── core/           # Core library components
//!     ├── config      # Generation policy and access-level configuration
//!     ├── types       # Staging labels, credential payloads, versions
//!     ├── vault/      # Vault client adapter
//!     │   ├── mod     # VaultClient trait
//!     │   └── memory  # In-memory reference implementation
//!     ├── target      # Pluggable target-resource updater (apply/verify)
//!     └── rotation/   # Rotation state machine
//!         ├── mod     # Rotator, RotationRequest, step dispatch
//!         └── steps   # create / set / test / finish handlers
//! ```
//!
//! # Features
//!
//! - Idempotent, retry-safe step handlers keyed by orchestrator request tokens
//! - Atomic staging-label promotion (CURRENT / PENDING / PREVIOUS)
//! - Configurable candidate generation policy (length, character classes)
//! - Extensible vault and target-resource backends

pub mod core;
pub mod error;
