//! Instruction vocabulary exchanged between device and host
//!
//! Instructions travel as the decimal text of a small integer. Answers
//! (`No`/`Yes`) flow host → device; requests flow device → host.

/// Known instruction codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Instruction {
    /// Negative answer; also ends a list of sequences
    No,
    /// Positive answer
    Yes,
    /// Ask the host whether it has sequences to offer
    CheckForSequences,
    /// Ask the host to let the user choose between host and board sequences
    AskUser,
    /// Ask the host to send its sequences now
    SendSequences,
}

// Wire format values
const INS_NO: i32 = 0;
const INS_YES: i32 = 1;
const INS_CHECK_FOR_SEQUENCES: i32 = 2;
const INS_ASK_USER: i32 = 3;
const INS_SEND_SEQUENCES: i32 = 4;

impl Instruction {
    /// Parse an instruction from its integer code
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            INS_NO => Some(Instruction::No),
            INS_YES => Some(Instruction::Yes),
            INS_CHECK_FOR_SEQUENCES => Some(Instruction::CheckForSequences),
            INS_ASK_USER => Some(Instruction::AskUser),
            INS_SEND_SEQUENCES => Some(Instruction::SendSequences),
            _ => None,
        }
    }

    /// Integer code sent on the wire
    pub fn code(self) -> i32 {
        match self {
            Instruction::No => INS_NO,
            Instruction::Yes => INS_YES,
            Instruction::CheckForSequences => INS_CHECK_FOR_SEQUENCES,
            Instruction::AskUser => INS_ASK_USER,
            Instruction::SendSequences => INS_SEND_SEQUENCES,
        }
    }

    /// Answer instruction for a yes/no decision
    pub fn answer(yes: bool) -> Self {
        if yes {
            Instruction::Yes
        } else {
            Instruction::No
        }
    }

    /// The decision carried by an answer, if this is one
    pub fn as_answer(self) -> Option<bool> {
        match self {
            Instruction::Yes => Some(true),
            Instruction::No => Some(false),
            _ => None,
        }
    }
}
