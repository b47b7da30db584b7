use std::fmt::{self, Display, Formatter};

use serde_with::SerializeDisplay;
use thiserror::Error;

use crate::protocol::{CommandKind, command_metadata, kind_for_id};

const START: char = '$';
const END: char = '$';
const COUNT_SEPARATOR: char = '*';
const FIELD_SEPARATOR: char = '#';

/// Characters that cannot appear inside a parameter.
pub(crate) const RESERVED: [char; 3] = [START, COUNT_SEPARATOR, FIELD_SEPARATOR];

/// Errors returned by command framing and parsing.
#[derive(Debug, Error, Clone, Eq, PartialEq)]
pub enum WireCodecError {
    /// The parameter count differs from the count fixed for the command id.
    #[error("command `{id}` declares {declared} parameter(s) but carries {emitted}")]
    ParamCountMismatch {
        id: String,
        declared: usize,
        emitted: usize,
    },
    #[error("parameter {position} (`{value}`) contains a reserved framing character")]
    ReservedCharacter { position: usize, value: String },
    #[error("parameter {position} is empty")]
    EmptyParameter { position: usize },
    #[error("command must start and end with `$`")]
    MissingDelimiters,
    #[error("malformed command header `{header}`")]
    InvalidHeader { header: String },
    #[error("unknown command id `{id}`")]
    UnknownCommand { id: String },
}

/// One framed command ready for transmission.
///
/// ```
/// use trailcam::{CommandKind, WireCodec};
///
/// let command = WireCodec::frame(CommandKind::TriggerCapture, vec!["1".into()])?;
/// assert_eq!("$03*1#1$", command.to_string());
/// # Ok::<(), trailcam::WireCodecError>(())
/// ```
#[derive(Debug, Clone, Eq, PartialEq, SerializeDisplay)]
pub struct WireCommand {
    kind: CommandKind,
    params: Vec<String>,
}

impl WireCommand {
    #[must_use]
    pub fn kind(&self) -> CommandKind {
        self.kind
    }

    #[must_use]
    pub fn params(&self) -> &[String] {
        &self.params
    }

    /// Character count of the framed command.
    #[must_use]
    pub fn char_len(&self) -> usize {
        self.to_string().chars().count()
    }
}

impl Display for WireCommand {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let metadata = command_metadata(self.kind);
        write!(
            f,
            "{START}{}{COUNT_SEPARATOR}{}",
            metadata.id(),
            self.params.len()
        )?;
        for param in &self.params {
            write!(f, "{FIELD_SEPARATOR}{param}")?;
        }
        write!(f, "{END}")
    }
}

/// Framing rules for `$<id>*<count>#p1#...#pN$` commands.
pub struct WireCodec;

impl WireCodec {
    /// Frames positional parameters for a command kind.
    ///
    /// # Errors
    ///
    /// Returns an error when the parameter count differs from the command's
    /// fixed count, or a parameter is empty or contains `#`, `$` or `*`.
    pub fn frame(kind: CommandKind, params: Vec<String>) -> Result<WireCommand, WireCodecError> {
        let metadata = command_metadata(kind);
        if params.len() != metadata.param_count() {
            return Err(WireCodecError::ParamCountMismatch {
                id: metadata.id().to_string(),
                declared: metadata.param_count(),
                emitted: params.len(),
            });
        }

        for (index, param) in params.iter().enumerate() {
            let position = index + 1;
            if param.is_empty() {
                return Err(WireCodecError::EmptyParameter { position });
            }
            if param.contains(RESERVED) {
                return Err(WireCodecError::ReservedCharacter {
                    position,
                    value: param.clone(),
                });
            }
        }

        Ok(WireCommand { kind, params })
    }

    /// Parses a framed command, checking the declared count against both the
    /// carried fields and the command id.
    ///
    /// # Errors
    ///
    /// Returns an error for missing delimiters, malformed headers, unknown ids
    /// or count mismatches.
    pub fn parse(input: &str) -> Result<WireCommand, WireCodecError> {
        let body = input
            .trim()
            .strip_prefix(START)
            .and_then(|rest| rest.strip_suffix(END))
            .ok_or(WireCodecError::MissingDelimiters)?;

        let mut fields = body.split(FIELD_SEPARATOR);
        let header = fields.next().unwrap_or_default();
        let params = fields.map(str::to_string).collect::<Vec<_>>();

        let invalid_header = || WireCodecError::InvalidHeader {
            header: header.to_string(),
        };
        let (id, declared) = header.split_once(COUNT_SEPARATOR).ok_or_else(invalid_header)?;
        let declared = declared.parse::<usize>().map_err(|_error| invalid_header())?;
        if declared != params.len() {
            return Err(WireCodecError::ParamCountMismatch {
                id: id.to_string(),
                declared,
                emitted: params.len(),
            });
        }

        let kind = kind_for_id(id).ok_or_else(|| WireCodecError::UnknownCommand {
            id: id.to_string(),
        })?;
        Self::frame(kind, params)
    }
}
