use std::fmt::Display;

use num_enum::TryFromPrimitive;
use thiserror::Error;

/// Decoded instruction, operands included.
#[derive(Debug, PartialEq, Clone)]
pub enum OpCode {
    Constant(u16),
    Add,
    Subtract,
    Multiply,
    Divide,
    True,
    False,
    Equal,
    NotEqual,
    GreaterThan,
    Minus,
    Bang,
    Pop,
}

impl OpCode {
    pub fn id(&self) -> OpCodeId {
        match self {
            OpCode::Constant(_) => OpCodeId::Constant,
            OpCode::Add => OpCodeId::Add,
            OpCode::Subtract => OpCodeId::Subtract,
            OpCode::Multiply => OpCodeId::Multiply,
            OpCode::Divide => OpCodeId::Divide,
            OpCode::True => OpCodeId::True,
            OpCode::False => OpCodeId::False,
            OpCode::Equal => OpCodeId::Equal,
            OpCode::NotEqual => OpCodeId::NotEqual,
            OpCode::GreaterThan => OpCodeId::GreaterThan,
            OpCode::Minus => OpCodeId::Minus,
            OpCode::Bang => OpCodeId::Bang,
            OpCode::Pop => OpCodeId::Pop,
        }
    }

    pub fn bytes(&self) -> Vec<u8> {
        match self {
            OpCode::Constant(constant) => make(OpCodeId::Constant, &[usize::from(*constant)]),
            other => make(other.id(), &[]),
        }
    }
}

impl Display for OpCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OpCode::Constant(constant) => write!(f, "{} {}", self.id().name(), constant),
            other => write!(f, "{}", other.id().name()),
        }
    }
}

/// The opcode byte. Discriminants are the wire encoding.
#[repr(u8)]
#[derive(Debug, PartialEq, Eq, Clone, Copy, TryFromPrimitive)]
pub enum OpCodeId {
    Constant,
    Add,
    Subtract,
    Multiply,
    Divide,
    True,
    False,
    Equal,
    NotEqual,
    GreaterThan,
    Minus,
    Bang,
    Pop,
}

impl OpCodeId {
    pub fn name(self) -> &'static str {
        match self {
            OpCodeId::Constant => "OpConstant",
            OpCodeId::Add => "OpAdd",
            OpCodeId::Subtract => "OpSub",
            OpCodeId::Multiply => "OpMul",
            OpCodeId::Divide => "OpDiv",
            OpCodeId::True => "OpTrue",
            OpCodeId::False => "OpFalse",
            OpCodeId::Equal => "OpEqual",
            OpCodeId::NotEqual => "OpNotEqual",
            OpCodeId::GreaterThan => "OpGreaterThan",
            OpCodeId::Minus => "OpMinus",
            OpCodeId::Bang => "OpBang",
            OpCodeId::Pop => "OpPop",
        }
    }

    /// Width in bytes of each operand that follows the opcode byte.
    pub fn operand_widths(self) -> &'static [usize] {
        match self {
            OpCodeId::Constant => &[2],
            _ => &[],
        }
    }
}

/// Encodes one instruction. Operands are written big-endian, truncated to
/// the widths `op` declares; missing operands are not padded.
pub fn make(op: OpCodeId, operands: &[usize]) -> Vec<u8> {
    let widths = op.operand_widths();
    let mut out = Vec::with_capacity(1 + widths.iter().sum::<usize>());
    out.push(op as u8);
    for (operand, &width) in operands.iter().zip(widths) {
        let bytes = operand.to_be_bytes();
        out.extend_from_slice(&bytes[bytes.len() - width..]);
    }
    out
}

#[derive(Debug, PartialEq, Clone, Default)]
pub struct Instructions {
    pub bytes: Vec<u8>,
}

impl Instructions {
    pub fn new() -> Instructions {
        Instructions { bytes: Vec::new() }
    }

    /// Iterates over `(offset, instruction)` pairs from the start.
    pub fn iter(&self) -> InstructionsIter {
        InstructionsIter {
            instructions: self,
            offset: 0,
        }
    }

    pub fn push(&mut self, op: &OpCode) {
        self.bytes.extend_from_slice(&op.bytes());
    }
}

/// One line per instruction: zero padded byte offset, name, operands.
impl Display for Instructions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for instruction in self.iter() {
            match instruction {
                Ok((offset, op)) => writeln!(f, "{:04} {}", offset, op)?,
                Err(err) => writeln!(f, "ERROR: {}", err)?,
            }
        }
        Ok(())
    }
}

pub struct InstructionsIter<'a> {
    instructions: &'a Instructions,
    offset: usize,
}

impl<'a> InstructionsIter<'a> {
    fn read_u8(&mut self) -> Option<u8> {
        let offset = self.offset;
        self.offset += 1;
        self.instructions.bytes.get(offset).copied()
    }

    fn read_u16(&mut self) -> Option<u16> {
        let b1 = self.read_u8();
        let b2 = self.read_u8();
        Some(u16::from_be_bytes([b1?, b2?]))
    }

    fn fail(
        &mut self,
        error: InstructionReadError,
    ) -> Option<Result<(usize, OpCode), InstructionReadError>> {
        self.offset = self.instructions.bytes.len();
        Some(Err(error))
    }
}

#[derive(Debug, PartialEq, Error)]
pub enum InstructionReadError {
    #[error("unexpected end of instructions at {0}")]
    UnexpectedEndOfInstructions(usize),
    #[error("invalid opcode {opcode} at {offset}")]
    InvalidOpCode { opcode: u8, offset: usize },
}

impl<'a> Iterator for InstructionsIter<'a> {
    type Item = Result<(usize, OpCode), InstructionReadError>;

    fn next(&mut self) -> Option<Self::Item> {
        let start = self.offset;
        let op = self.read_u8()?;

        let Ok(op) = OpCodeId::try_from(op) else {
            return self.fail(InstructionReadError::InvalidOpCode {
                opcode: op,
                offset: start,
            });
        };

        let decoded = match op {
            OpCodeId::Constant => match self.read_u16() {
                Some(constant) => OpCode::Constant(constant),
                None => return self.fail(InstructionReadError::UnexpectedEndOfInstructions(start)),
            },
            OpCodeId::Add => OpCode::Add,
            OpCodeId::Subtract => OpCode::Subtract,
            OpCodeId::Multiply => OpCode::Multiply,
            OpCodeId::Divide => OpCode::Divide,
            OpCodeId::True => OpCode::True,
            OpCodeId::False => OpCode::False,
            OpCodeId::Equal => OpCode::Equal,
            OpCodeId::NotEqual => OpCode::NotEqual,
            OpCodeId::GreaterThan => OpCode::GreaterThan,
            OpCodeId::Minus => OpCode::Minus,
            OpCodeId::Bang => OpCode::Bang,
            OpCodeId::Pop => OpCode::Pop,
        };
        Some(Ok((start, decoded)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_make() {
        let tests = vec![
            (OpCodeId::Constant, vec![65534], vec![OpCodeId::Constant as u8, 255, 254]),
            (OpCodeId::Constant, vec![1], vec![0, 0, 1]),
            (OpCodeId::Add, vec![], vec![OpCodeId::Add as u8]),
            (OpCodeId::Pop, vec![], vec![12]),
        ];

        for (op, operands, expected) in tests {
            assert_eq!(make(op, &operands), expected);
        }
    }

    #[test]
    fn test_opcode_bytes_match_make() {
        assert_eq!(OpCode::Constant(65534).bytes(), vec![0, 255, 254]);
        assert_eq!(OpCode::Bang.bytes(), make(OpCodeId::Bang, &[]));
    }

    #[test]
    fn test_decode() {
        let mut instructions = Instructions::new();
        let ops = vec![OpCode::Add, OpCode::Constant(2), OpCode::Constant(65535)];
        for op in &ops {
            instructions.push(op);
        }

        let decoded = instructions
            .iter()
            .collect::<Result<Vec<_>, _>>()
            .unwrap();

        assert_eq!(
            decoded,
            vec![
                (0, OpCode::Add),
                (1, OpCode::Constant(2)),
                (4, OpCode::Constant(65535)),
            ]
        );
    }

    #[test]
    fn test_disassembly() {
        let mut instructions = Instructions::new();
        instructions.push(&OpCode::Add);
        instructions.push(&OpCode::Constant(2));
        instructions.push(&OpCode::Constant(65535));

        assert_eq!(
            instructions.to_string(),
            "0000 OpAdd\n0001 OpConstant 2\n0004 OpConstant 65535\n"
        );
    }

    #[test]
    fn test_malformed_instructions() {
        let invalid = Instructions {
            bytes: vec![OpCodeId::Pop as u8, 200, OpCodeId::Pop as u8],
        };
        let decoded = invalid.iter().collect::<Vec<_>>();
        assert_eq!(
            decoded,
            vec![
                Ok((0, OpCode::Pop)),
                Err(InstructionReadError::InvalidOpCode {
                    opcode: 200,
                    offset: 1
                }),
            ]
        );

        let truncated = Instructions {
            bytes: vec![OpCodeId::Constant as u8, 1],
        };
        assert_eq!(
            truncated.iter().collect::<Vec<_>>(),
            vec![Err(InstructionReadError::UnexpectedEndOfInstructions(0))]
        );
    }
}
