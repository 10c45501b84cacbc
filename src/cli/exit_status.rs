use std::process::ExitCode;

/// Process exit status, encoded in the discriminant.
///
/// `Success` means the command completed with nothing to do or changes
/// applied. `Failure` means it completed but found problems: conflicts,
/// unusable resource files, or pending changes under `status`. `Error`
/// means the command itself failed (bad config, IO failure).
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum ExitStatus {
    Success = 0,
    Failure = 1,
    Error = 2,
}

impl From<ExitStatus> for ExitCode {
    fn from(status: ExitStatus) -> Self {
        ExitCode::from(status as u8)
    }
}
