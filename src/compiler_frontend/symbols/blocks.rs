use crate::compiler_frontend::symbols::identifiers::IdentId;
use crate::compiler_frontend::symbols::modules::ModuleId;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BlockId(u32);

impl BlockId {
    /// Module scope
    pub const GLOBAL: BlockId = BlockId(0);

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Clone, Debug)]
struct BlockFrame {
    block: BlockId,

    // Set on the outermost block of a function body
    function: Option<IdentId>,
    frame_size: i64,
}

/// The stack of active lexical blocks.
/// Depth 0 is module scope, which decides between folding a declaration
/// into a constant now and emitting code to run later.
#[derive(Clone, Debug)]
pub struct Blocks {
    stack: Vec<BlockFrame>,
    next_block: u32,

    /// The module currently being parsed
    pub module: ModuleId,
}

impl Default for Blocks {
    fn default() -> Self {
        Self::new()
    }
}

impl Blocks {
    pub fn new() -> Self {
        Blocks {
            stack: vec![BlockFrame {
                block: BlockId::GLOBAL,
                function: None,
                frame_size: 0,
            }],
            next_block: 1,
            module: ModuleId::default(),
        }
    }

    pub fn depth(&self) -> usize {
        self.stack.len() - 1
    }

    pub fn is_global(&self) -> bool {
        self.depth() == 0
    }

    pub fn current(&self) -> BlockId {
        self.stack.last().map_or(BlockId::GLOBAL, |frame| frame.block)
    }

    pub fn active(&self) -> impl DoubleEndedIterator<Item = BlockId> + '_ {
        self.stack.iter().map(|frame| frame.block)
    }

    /// Function bodies start a new local frame
    pub fn enter(&mut self, function: Option<IdentId>) -> BlockId {
        let block = BlockId(self.next_block);
        self.next_block += 1;

        self.stack.push(BlockFrame {
            block,
            function,
            frame_size: 0,
        });

        block
    }

    pub fn leave(&mut self) {
        // Module scope is never popped
        if self.stack.len() > 1 {
            self.stack.pop();
        }
    }

    /// The function whose body is being parsed, if any
    pub fn current_function(&self) -> Option<IdentId> {
        self.stack.iter().rev().find_map(|frame| frame.function)
    }

    /// Reserves space in the enclosing function frame.
    /// Offsets only ever grow, so locals are laid out in declaration order.
    /// None means the frame would outgrow an i64.
    pub fn allocate_local(&mut self, size: i64) -> Option<i64> {
        let frame = self
            .stack
            .iter_mut()
            .rev()
            .find(|frame| frame.function.is_some());

        match frame {
            Some(frame) => {
                let offset = frame.frame_size;
                frame.frame_size = offset.checked_add(size)?;
                Some(offset)
            }
            None => Some(0),
        }
    }
}
