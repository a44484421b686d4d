//! CLI Exit Code Registry
//!
//! Single source of truth for `defbot` exit codes. Agents and scripts branch
//! on these, so they are part of the shell contract.
//!
//! | Code | Meaning                                                       |
//! |------|---------------------------------------------------------------|
//! | 0    | Success                                                       |
//! | 1    | General error (config, unexpected I/O)                        |
//! | 2    | Usage error (bad arguments)                                   |
//! | 3    | Not found (unknown student, no saved record)                  |
//! | 4    | Validation failed (committee too small)                       |
//! | 5    | Needs clarification (location or committee unresolved)       |
//! | 6    | Template missing                                              |
//! | 7    | Render failed                                                 |
//! | 8    | Database error                                                |

use defensebot_recon::ValidationError;
use defensebot_render::RenderError;
use defensebot_cli::WorkflowError;

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments, missing required options.
pub const EXIT_USAGE: u8 = 2;

/// Unknown student, or a student with no saved record to render.
pub const EXIT_NOT_FOUND: u8 = 3;

/// Draft rejected: fewer committee members than required.
pub const EXIT_VALIDATION: u8 = 4;

/// Draft rejected with candidates or unresolved names; re-ask and retry.
pub const EXIT_NEEDS_CLARIFICATION: u8 = 5;

/// Announcement template file does not exist.
pub const EXIT_TEMPLATE_MISSING: u8 = 6;

/// Template unreadable or artifact could not be written.
pub const EXIT_RENDER: u8 = 7;

/// SQLite or seed import failure.
pub const EXIT_STORE: u8 = 8;

pub fn validation_exit_code(err: &ValidationError) -> u8 {
    if err.needs_clarification() {
        EXIT_NEEDS_CLARIFICATION
    } else {
        EXIT_VALIDATION
    }
}

pub fn render_exit_code(err: &RenderError) -> u8 {
    if err.is_template_missing() {
        EXIT_TEMPLATE_MISSING
    } else {
        EXIT_RENDER
    }
}

pub fn workflow_exit_code(err: &WorkflowError) -> u8 {
    match err {
        WorkflowError::UnknownStudent(_) | WorkflowError::NoHistory(_) => EXIT_NOT_FOUND,
        WorkflowError::Validation(v) => validation_exit_code(v),
        WorkflowError::Render(r) => render_exit_code(r),
        WorkflowError::Store(_) => EXIT_STORE,
    }
}
