//! CLI Exit Code Registry
//!
//! Single source of truth for exit codes. They are part of the shell
//! contract — scripts rely on them.
//!
//! | Code | Meaning                                             |
//! |------|-----------------------------------------------------|
//! | 0    | Completed run, even with zero matches               |
//! | 2    | Usage error (bad arguments, missing file)           |
//! | 3    | Invalid configuration                               |
//! | 4    | Snapshot failure; aborted before any mutation       |
//! | 5    | Commit failure; transaction rolled back             |
//! | 6    | Other storage or runtime failure                    |

/// Completed run. Zero matches is still a completed run.
pub const EXIT_SUCCESS: u8 = 0;

/// Bad arguments or unreadable input file.
pub const EXIT_USAGE: u8 = 2;

/// Config failed to parse or validate.
pub const EXIT_CONFIG: u8 = 3;

/// Pre-mutation snapshot failed; nothing was touched.
pub const EXIT_SNAPSHOT: u8 = 4;

/// Apply transaction failed and rolled back; safe to retry.
pub const EXIT_COMMIT: u8 = 5;

/// Any other storage or runtime failure.
pub const EXIT_STORAGE: u8 = 6;
