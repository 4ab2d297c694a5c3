use std::cmp::Ordering;
use std::fmt::{Display, Formatter};
use std::ops::RangeInclusive;

use anyhow::anyhow;
use serde::{Deserialize, Serialize};

use crate::StdResult;
use crate::entities::BlockNumber;

/// An inclusive range of blocks `[start, end]`, the unit of a log source request.
#[derive(Serialize, Deserialize, Copy, Clone, Eq, PartialEq, Debug, Hash)]
pub struct BlockRange {
    /// First block of the range
    pub start: BlockNumber,

    /// Last block of the range, included
    pub end: BlockNumber,
}

impl BlockRange {
    /// BlockRange factory, fails if `start` is after `end`
    pub fn try_new(start: BlockNumber, end: BlockNumber) -> StdResult<Self> {
        if start > end {
            return Err(anyhow!(
                "BlockRange start '{start}' must not be after its end '{end}'"
            ));
        }

        Ok(Self { start, end })
    }

    /// Check if the given block is inside the range
    pub fn contains(&self, block_number: BlockNumber) -> bool {
        self.as_range_inclusive().contains(&block_number)
    }

    /// Split the range in consecutive windows of `window_size` blocks, the last one clipped
    /// to the end of the range.
    pub fn windows(&self, window_size: u64) -> StdResult<BlockRangeWindows> {
        if window_size == 0 {
            return Err(anyhow!("BlockRange window size must be strictly positive"));
        }

        Ok(BlockRangeWindows {
            next_start: Some(self.start),
            end: self.end,
            window_size,
        })
    }

    fn as_range_inclusive(&self) -> RangeInclusive<BlockNumber> {
        self.start..=self.end
    }
}

impl Display for BlockRange {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}, {}]", self.start, self.end)
    }
}

impl PartialOrd for BlockRange {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(std::cmp::Ord::cmp(self, other))
    }
}

impl Ord for BlockRange {
    fn cmp(&self, other: &Self) -> Ordering {
        // Order by range start, then by range end
        match self.start.cmp(&other.start) {
            Ordering::Equal => self.end.cmp(&other.end),
            order => order,
        }
    }
}

/// Iterator over the consecutive windows of a [BlockRange]
#[derive(Debug, Clone)]
pub struct BlockRangeWindows {
    next_start: Option<BlockNumber>,
    end: BlockNumber,
    window_size: u64,
}

impl Iterator for BlockRangeWindows {
    type Item = BlockRange;

    fn next(&mut self) -> Option<Self::Item> {
        let start = self.next_start?;
        let window_end = start
            .saturating_add(self.window_size - 1)
            .min(self.end);
        self.next_start = if window_end >= self.end {
            None
        } else {
            Some(window_end + 1)
        };

        Some(BlockRange {
            start,
            end: window_end,
        })
    }
}
