//! Block and move detection.
//!
//! The token links produced by the matcher are turned into a sequence of
//! blocks in new text order:
//!
//! * runs of linked tokens become `=` blocks,
//! * runs of `=` blocks with consecutive old positions form groups,
//! * groups whose order crosses the old order form sections, and inside every
//!   section the heaviest order preserving chain of groups is kept fixed while
//!   all other groups are considered moved,
//! * unlinked old tokens become `-` blocks placed next to a fixed neighbor,
//!   unlinked new tokens become `+` blocks,
//! * every moved group leaves a `|` mark block at its old position.
use crate::algorithms::slide::slide_gaps;
use crate::config::DiffConfig;
use crate::patterns::Patterns;
use crate::text::TextVersion;

mod fixed;

use self::fixed::find_max_path;

/// The kind of a block.
#[derive(Clone, Copy, Hash, PartialEq, Eq, Debug)]
pub(crate) enum BlockKind {
    /// Unchanged text (`=`).
    Same,
    /// Deleted text (`-`).
    Delete,
    /// Inserted text (`+`).
    Insert,
    /// The old position of a moved group (`|`).
    Mark,
}

/// A run of tokens with the same fate.
#[derive(Clone, Debug)]
pub(crate) struct Block<'s> {
    pub kind: BlockKind,
    pub old_block: Option<usize>,
    /// Sort key in old text order.
    pub old_number: Option<usize>,
    /// Sort key in new text order, `None` sorts before everything.
    pub new_number: Option<usize>,
    pub old_start: Option<usize>,
    pub count: usize,
    pub unique: bool,
    pub words: usize,
    pub chars: usize,
    pub text: &'s str,
    pub section: Option<usize>,
    pub group: Option<usize>,
    pub fixed: bool,
    /// For marks: the moved group.
    pub moved: Option<usize>,
}

impl<'s> Block<'s> {
    fn new(kind: BlockKind, text: &'s str, patterns: &Patterns) -> Block<'s> {
        Block {
            kind,
            old_block: None,
            old_number: None,
            new_number: None,
            old_start: None,
            count: 0,
            unique: false,
            words: patterns.word_count(text),
            chars: text.chars().count(),
            text,
            section: None,
            group: None,
            fixed: false,
            moved: None,
        }
    }
}

/// Consecutive blocks that stayed together.
#[derive(Clone, Debug, Default)]
pub(crate) struct Group {
    pub old_number: Option<usize>,
    pub block_start: usize,
    pub block_end: usize,
    pub unique: bool,
    pub max_words: usize,
    pub chars: usize,
    /// Fixed groups did not move.
    pub fixed: bool,
    /// For moved groups: the group holding the mark.
    pub moved_from: Option<usize>,
    pub color: Option<usize>,
}

/// A span of blocks with crossing old positions.
#[derive(Clone, Copy, Debug)]
struct Section {
    block_start: usize,
    block_end: usize,
}

/// The detected blocks in new text order and their groups.
#[derive(Clone, Debug, Default)]
pub(crate) struct Layout<'s> {
    pub blocks: Vec<Block<'s>>,
    pub groups: Vec<Group>,
}

impl<'s> Layout<'s> {
    /// Concatenates the `=` and `-` blocks in old text order.
    pub fn old_text(&self) -> String {
        let mut blocks = self
            .blocks
            .iter()
            .filter(|block| matches!(block.kind, BlockKind::Same | BlockKind::Delete))
            .collect::<Vec<_>>();
        blocks.sort_by_key(|block| block.old_number);
        blocks.iter().map(|block| block.text).collect()
    }

    /// Concatenates the `=` and `+` blocks in new text order.
    pub fn new_text(&self) -> String {
        self.blocks
            .iter()
            .filter(|block| matches!(block.kind, BlockKind::Same | BlockKind::Insert))
            .map(|block| block.text)
            .collect()
    }
}

/// Turns token links into blocks, groups and move marks.
pub(crate) struct BlockDetector<'a, 's> {
    new: &'a mut TextVersion<'s>,
    old: &'a mut TextVersion<'s>,
    config: &'a DiffConfig,
    patterns: &'a Patterns,
    blocks: Vec<Block<'s>>,
    groups: Vec<Group>,
    sections: Vec<Section>,
    max_words: usize,
}

impl<'a, 's> BlockDetector<'a, 's> {
    /// Creates a detector over two enumerated text versions.
    pub fn new(
        new: &'a mut TextVersion<'s>,
        old: &'a mut TextVersion<'s>,
        config: &'a DiffConfig,
        patterns: &'a Patterns,
    ) -> BlockDetector<'a, 's> {
        BlockDetector {
            new,
            old,
            config,
            patterns,
            blocks: Vec::new(),
            groups: Vec::new(),
            sections: Vec::new(),
            max_words: 0,
        }
    }

    /// Runs the full detection.
    pub fn detect(mut self) -> Layout<'s> {
        self.build_same_structure();

        let min_length = self.config.min_block_length();
        if self.config.is_unlinking_blocks() && min_length > 0 {
            let mut cycles = 0;
            while cycles < self.config.max_unlink_cycles()
                && self.max_words >= min_length
                && self.unlink_blocks()
            {
                cycles += 1;
                self.relink();
            }
            log::debug!("unlinked short blocks in {} cycles", cycles);
        }

        if !self.config.is_showing_block_moves() && self.unlink_moved_groups() {
            self.relink();
        }

        self.get_del_blocks();
        self.position_del_blocks();
        self.get_ins_blocks();
        self.set_ins_groups();
        self.insert_marks();
        log::debug!(
            "detected {} blocks in {} groups",
            self.blocks.len(),
            self.groups.len()
        );

        Layout {
            blocks: self.blocks,
            groups: self.groups,
        }
    }

    /// Normalizes the gaps left by unlinking and rebuilds the structure.
    fn relink(&mut self) {
        slide_gaps(self.new, self.old);
        slide_gaps(self.old, self.new);
        self.build_same_structure();
    }

    fn build_same_structure(&mut self) {
        self.max_words = 0;
        self.get_same_blocks();
        self.get_sections();
        self.get_groups();
        self.set_fixed();
    }

    /// Collects runs of linked tokens as `=` blocks in new text order.
    fn get_same_blocks(&mut self) {
        self.blocks.clear();
        let mut j = self.old.first;
        while j.is_some() {
            while let Some(current) = j {
                if self.old.is_linked(current) {
                    break;
                }
                j = self.old.tokens[current].next;
            }
            let Some(old_start) = j else {
                break;
            };
            let Some(new_start) = self.old.tokens[old_start].link else {
                break;
            };

            let mut i = Some(new_start);
            let mut old_end = old_start;
            let mut count = 0;
            let mut unique = false;
            while let (Some(ii), Some(jj)) = (i, j) {
                if self.old.tokens[jj].link != Some(ii) {
                    break;
                }
                unique |= self.new.tokens[ii].unique;
                count += 1;
                old_end = jj;
                i = self.new.tokens[ii].next;
                j = self.old.tokens[jj].next;
            }

            let text = self.old.span(old_start, old_end);
            let mut block = Block::new(BlockKind::Same, text, self.patterns);
            block.old_block = Some(self.blocks.len());
            block.old_number = Some(self.old.tokens[old_start].number);
            block.new_number = Some(self.new.tokens[new_start].number);
            block.old_start = Some(old_start);
            block.count = count;
            block.unique = unique;
            self.blocks.push(block);
        }

        self.blocks.sort_by_key(|block| block.new_number);
    }

    /// Finds the spans of blocks whose old positions cross each other.
    fn get_sections(&mut self) {
        self.sections.clear();
        let mut block = 0;
        while block < self.blocks.len() {
            let section_start = block;
            let mut section_end = block;
            let mut old_max = self.blocks[section_start].old_number;
            let mut section_old_max = old_max;
            for j in section_start + 1..self.blocks.len() {
                let old_number = self.blocks[j].old_number;
                if old_number > old_max {
                    old_max = old_number;
                } else if old_number < section_old_max {
                    section_end = j;
                    section_old_max = old_max;
                }
            }

            if section_end > section_start {
                let section = self.sections.len();
                self.sections.push(Section {
                    block_start: section_start,
                    block_end: section_end,
                });
                for block in &mut self.blocks[section_start..=section_end] {
                    block.section = Some(section);
                }
                block = section_end;
            }
            block += 1;
        }
    }

    /// Joins blocks with consecutive old positions into groups.
    fn get_groups(&mut self) {
        self.groups.clear();
        let mut block = 0;
        while block < self.blocks.len() {
            let group_start = block;
            let mut group_end = block;
            let first = &self.blocks[group_start];
            let mut old_block = first.old_block;
            let mut max_words = first.words;
            let mut unique = first.unique;
            let mut chars = first.chars;

            for i in group_end + 1..self.blocks.len() {
                let next = &self.blocks[i];
                if next.old_block != old_block.map(|b| b + 1) {
                    break;
                }
                old_block = next.old_block;
                max_words = max_words.max(next.words);
                unique |= next.unique;
                chars += next.chars;
                group_end = i;
            }

            // groups outside of sections never move
            let fixed = self.blocks[group_start].section.is_none();
            let group = self.groups.len();
            self.groups.push(Group {
                old_number: self.blocks[group_start].old_number,
                block_start: group_start,
                block_end: group_end,
                unique,
                max_words,
                chars,
                fixed,
                moved_from: None,
                color: None,
            });
            self.max_words = self.max_words.max(max_words);
            for block in &mut self.blocks[group_start..=group_end] {
                block.group = Some(group);
                block.fixed = fixed;
            }
            block = group_end + 1;
        }
    }

    /// Marks the heaviest order preserving chain of groups in every section
    /// as fixed.
    fn set_fixed(&mut self) {
        for section in &self.sections {
            let (Some(group_start), Some(group_end)) = (
                self.blocks[section.block_start].group,
                self.blocks[section.block_end].group,
            ) else {
                continue;
            };
            for group in find_max_path(&self.groups, group_start, group_end) {
                let group = &mut self.groups[group];
                group.fixed = true;
                for block in &mut self.blocks[group.block_start..=group.block_end] {
                    block.fixed = true;
                }
            }
        }
    }

    /// Unlinks groups that are too short to count as a move on their own and
    /// the single word flanks of longer groups.
    ///
    /// Returns `true` if any block was unlinked.
    fn unlink_blocks(&mut self) -> bool {
        let min_length = self.config.min_block_length();
        let mut doomed = Vec::new();
        for group in &self.groups {
            if group.max_words < min_length && !group.unique {
                doomed.extend(
                    (group.block_start..=group.block_end)
                        .filter(|&block| self.blocks[block].kind == BlockKind::Same),
                );
                continue;
            }

            let mut block_start = group.block_start;
            for block in group.block_start..=group.block_end {
                let candidate = &self.blocks[block];
                if candidate.kind != BlockKind::Same {
                    continue;
                }
                if candidate.words > 1 || candidate.unique {
                    break;
                }
                doomed.push(block);
                block_start = block;
            }
            for block in (block_start + 1..=group.block_end).rev() {
                let candidate = &self.blocks[block];
                if candidate.kind != BlockKind::Same {
                    continue;
                }
                if candidate.words > 1 || (candidate.words == 1 && candidate.unique) {
                    break;
                }
                doomed.push(block);
            }
        }

        for &block in &doomed {
            self.unlink_block(block);
        }
        !doomed.is_empty()
    }

    /// Unlinks every group that is not fixed.
    fn unlink_moved_groups(&mut self) -> bool {
        let doomed = self
            .groups
            .iter()
            .filter(|group| !group.fixed)
            .flat_map(|group| group.block_start..=group.block_end)
            .filter(|&block| self.blocks[block].kind == BlockKind::Same)
            .collect::<Vec<_>>();
        for &block in &doomed {
            self.unlink_block(block);
        }
        !doomed.is_empty()
    }

    fn unlink_block(&mut self, block: usize) {
        let (mut j, count) = (self.blocks[block].old_start, self.blocks[block].count);
        for _ in 0..count {
            let Some(current) = j else {
                break;
            };
            if let Some(link) = self.old.tokens[current].link.take() {
                self.new.tokens[link].link = None;
            }
            j = self.old.tokens[current].next;
        }
    }

    /// Collects runs of unlinked old tokens as `-` blocks.
    fn get_del_blocks(&mut self) {
        let mut j = self.old.first;
        while j.is_some() {
            let old_start = j;
            let mut old_end = None;
            let mut count = 0;
            while let Some(current) = j {
                if self.old.is_linked(current) {
                    break;
                }
                count += 1;
                old_end = Some(current);
                j = self.old.tokens[current].next;
            }

            if let (Some(old_start), Some(old_end)) = (old_start, old_end) {
                let text = self.old.span(old_start, old_end);
                let mut block = Block::new(BlockKind::Delete, text, self.patterns);
                block.old_number = Some(self.old.tokens[old_start].number);
                block.old_start = Some(old_start);
                block.count = count;
                self.blocks.push(block);
            }

            // skip the following run of linked tokens
            if let Some(current) = j {
                let mut i = self.old.tokens[current].link;
                while let (Some(ii), Some(jj)) = (i, j) {
                    if self.old.tokens[jj].link != Some(ii) {
                        break;
                    }
                    i = self.new.tokens[ii].next;
                    j = self.old.tokens[jj].next;
                }
            }
        }
    }

    /// Returns the block indices in old text order, without insertions.
    fn old_order(&self) -> Vec<usize> {
        let mut rv = (0..self.blocks.len())
            .filter(|&block| self.blocks[block].kind != BlockKind::Insert)
            .collect::<Vec<_>>();
        rv.sort_by_key(|&block| (self.blocks[block].old_number, self.blocks[block].new_number));
        rv
    }

    fn is_fixed_same(&self, block: usize) -> bool {
        let block = &self.blocks[block];
        block.kind == BlockKind::Same && block.fixed
    }

    /// The closest fixed `=` block at or before a position in old order.
    fn closest_fixed(&self, old_order: &[usize], pos: usize) -> Option<usize> {
        old_order[..pos]
            .iter()
            .rev()
            .copied()
            .find(|&block| self.is_fixed_same(block))
    }

    /// Attaches every `-` block to a neighboring `=` block in new text order.
    fn position_del_blocks(&mut self) {
        let old_order = self.old_order();
        for (pos, &del) in old_order.iter().enumerate() {
            if self.blocks[del].kind != BlockKind::Delete {
                continue;
            }
            let prev = pos.checked_sub(1).map(|p| old_order[p]);
            let next = old_order.get(pos + 1).copied();
            let is_same = |block: Option<usize>| {
                block.filter(|&block| self.blocks[block].kind == BlockKind::Same)
            };

            let reference = if let Some(prev) = is_same(prev).filter(|&b| self.is_fixed_same(b)) {
                Some(prev)
            } else if let Some(next) = is_same(next).filter(|&b| self.is_fixed_same(b)) {
                Some(next)
            } else if let Some(prev) = is_same(prev).filter(|&b| !self.is_group_end(b)) {
                Some(prev)
            } else if let Some(next) = is_same(next).filter(|&b| !self.is_group_start(b)) {
                Some(next)
            } else {
                self.closest_fixed(&old_order, pos + 1)
            };

            match reference {
                Some(reference) => {
                    let reference = self.blocks[reference].clone();
                    let block = &mut self.blocks[del];
                    block.new_number = reference.new_number;
                    block.section = reference.section;
                    block.group = reference.group;
                    block.fixed = reference.fixed;
                }
                None => self.blocks[del].new_number = None,
            }
        }
        self.sort_blocks();
    }

    fn is_group_start(&self, block: usize) -> bool {
        self.blocks[block]
            .group
            .map_or(false, |group| self.groups[group].block_start == block)
    }

    fn is_group_end(&self, block: usize) -> bool {
        self.blocks[block]
            .group
            .map_or(false, |group| self.groups[group].block_end == block)
    }

    /// Collects runs of unlinked new tokens as `+` blocks.
    fn get_ins_blocks(&mut self) {
        let mut i = self.new.first;
        while i.is_some() {
            while let Some(current) = i {
                if !self.new.is_linked(current) {
                    break;
                }
                i = self.new.tokens[current].next;
            }
            let Some(new_start) = i else {
                break;
            };
            let mut new_end = new_start;
            let mut count = 0;
            while let Some(current) = i {
                if self.new.is_linked(current) {
                    break;
                }
                count += 1;
                new_end = current;
                i = self.new.tokens[current].next;
            }

            let text = self.new.span(new_start, new_end);
            let mut block = Block::new(BlockKind::Insert, text, self.patterns);
            block.new_number = Some(self.new.tokens[new_start].number);
            block.count = count;
            self.blocks.push(block);
        }
        self.sort_blocks();
    }

    /// Assigns `+` and unattached `-` blocks to groups.
    fn set_ins_groups(&mut self) {
        for (idx, group) in self.groups.iter().enumerate() {
            for block in &mut self.blocks[group.block_start..=group.block_end] {
                if block.group.is_none() {
                    block.group = Some(idx);
                    block.fixed = group.fixed;
                }
            }
        }

        // everything else forms single block groups that never move
        for idx in 0..self.blocks.len() {
            if self.blocks[idx].group.is_some() {
                continue;
            }
            let block = &mut self.blocks[idx];
            block.group = Some(self.groups.len());
            block.fixed = true;
            self.groups.push(Group {
                old_number: block.old_number,
                block_start: idx,
                block_end: idx,
                unique: block.unique,
                max_words: block.words,
                chars: block.chars,
                fixed: true,
                moved_from: None,
                color: None,
            });
        }
    }

    /// Inserts a `|` mark at the old position of every moved group.
    fn insert_marks(&mut self) {
        let old_order = self.old_order();
        let mut lookup = vec![None; self.blocks.len()];
        for (pos, &block) in old_order.iter().enumerate() {
            lookup[block] = Some(pos);
        }

        let mut color = 1;
        for moved in 0..self.groups.len() {
            let group = &self.groups[moved];
            if group.fixed {
                continue;
            }
            let (Some(start_pos), Some(end_pos)) = (lookup[group.block_start], lookup[group.block_end])
            else {
                continue;
            };
            let moved_old_number = group.old_number;

            let prev = start_pos.checked_sub(1).map(|p| old_order[p]);
            let next = old_order.get(end_pos + 1).copied();
            let reference = match (prev, next) {
                (Some(prev), _) if self.is_fixed_same(prev) => Some(prev),
                (_, Some(next)) if self.is_fixed_same(next) => Some(next),
                _ => self.closest_fixed(&old_order, start_pos),
            };

            let (new_number, mark_group) = match reference {
                Some(reference) => (self.blocks[reference].new_number, self.blocks[reference].group),
                None => {
                    // moved away from before the first fixed block
                    let mark_group = self.groups.len();
                    self.groups.push(Group {
                        old_number: Some(0),
                        block_start: self.blocks.len(),
                        block_end: self.blocks.len(),
                        fixed: true,
                        ..Group::default()
                    });
                    (None, Some(mark_group))
                }
            };

            let mut mark = Block::new(BlockKind::Mark, "", self.patterns);
            mark.old_number = moved_old_number;
            mark.new_number = new_number;
            mark.group = mark_group;
            mark.fixed = true;
            mark.moved = Some(moved);
            self.blocks.push(mark);

            let group = &mut self.groups[moved];
            group.color = Some(color);
            group.moved_from = mark_group;
            color += 1;
        }
        self.sort_blocks();
    }

    /// Sorts the blocks into new text order and updates the group spans.
    fn sort_blocks(&mut self) {
        self.blocks
            .sort_by_key(|block| (block.new_number, block.old_number));
        let mut current = None;
        for (idx, block) in self.blocks.iter().enumerate() {
            let Some(group) = block.group else {
                continue;
            };
            if current != Some(group) {
                current = Some(group);
                self.groups[group].block_start = idx;
                self.groups[group].old_number = block.old_number;
            }
            self.groups[group].block_end = idx;
        }
    }
}

#[cfg(test)]
use crate::{
    algorithms::matcher::SymbolMatcher,
    text::{connect, Level},
};

#[cfg(test)]
fn word_layout<'s>(old: &'s str, new: &'s str, config: &DiffConfig) -> Layout<'s> {
    let patterns = Patterns::get();
    let mut old = TextVersion::new(old, patterns);
    let mut new = TextVersion::new(new, patterns);
    old.split(Level::Word, None, patterns);
    new.split(Level::Word, None, patterns);
    let mut matcher = SymbolMatcher::new(config, patterns);
    matcher.calculate_diff(&mut new, &mut old, Level::Word, true);
    new.enumerate();
    old.enumerate();
    BlockDetector::new(&mut new, &mut old, config, patterns).detect()
}

#[cfg(test)]
fn kinds<'s>(layout: &Layout<'s>) -> Vec<(BlockKind, &'s str)> {
    layout
        .blocks
        .iter()
        .map(|block| (block.kind, block.text))
        .collect()
}

#[test]
fn test_simple_replacement() {
    let layout = word_layout("A B C", "A X C", &DiffConfig::default());
    assert_eq!(
        kinds(&layout),
        vec![
            (BlockKind::Same, "A "),
            (BlockKind::Delete, "B"),
            (BlockKind::Insert, "X"),
            (BlockKind::Same, " C"),
        ]
    );
    assert_eq!(layout.groups.len(), 1);
    assert!(layout.groups[0].fixed);
    assert_eq!(layout.groups[0].block_start, 0);
    assert_eq!(layout.groups[0].block_end, 3);
}

#[test]
fn test_moved_group_gets_mark() {
    let mut config = DiffConfig::default();
    config.block_min_length(1);
    let layout = word_layout("cat dog bird", "bird cat dog", &config);
    assert_eq!(
        kinds(&layout),
        vec![
            (BlockKind::Same, "bird"),
            (BlockKind::Insert, " "),
            (BlockKind::Same, "cat dog"),
            (BlockKind::Delete, " "),
            (BlockKind::Mark, ""),
        ]
    );

    let moved = &layout.groups[0];
    assert!(!moved.fixed);
    assert_eq!(moved.color, Some(1));
    assert_eq!(layout.blocks[4].moved, Some(0));
    assert_eq!(moved.moved_from, layout.blocks[4].group);
    assert!(layout.groups.iter().filter(|g| g.color.is_some()).count() == 1);
    assert_eq!(layout.old_text(), "cat dog bird");
    assert_eq!(layout.new_text(), "bird cat dog");
}

#[test]
fn test_moves_suppressed() {
    let mut config = DiffConfig::default();
    config.block_min_length(1).show_block_moves(false);
    let layout = word_layout("cat dog bird", "bird cat dog", &config);
    assert!(layout.blocks.iter().all(|b| b.kind != BlockKind::Mark));
    assert!(layout.groups.iter().all(|g| g.color.is_none()));
    assert!(layout
        .blocks
        .iter()
        .any(|b| b.kind == BlockKind::Delete && b.text.contains("bird")));
}

#[test]
fn test_short_moves_are_unlinked() {
    let patterns = Patterns::get();
    let config = DiffConfig::default();
    let mut old = TextVersion::new("a b c d e", patterns);
    let mut new = TextVersion::new("d a b c e", patterns);
    old.split(Level::Word, None, patterns);
    new.split(Level::Word, None, patterns);
    let old_tokens = old.iter().collect::<Vec<_>>();
    let new_tokens = new.iter().collect::<Vec<_>>();
    for (i, j) in [(0, 6), (2, 0), (3, 1), (4, 2), (5, 3), (6, 4), (7, 7), (8, 8)] {
        connect(&mut new, new_tokens[i], &mut old, old_tokens[j]);
    }
    new.enumerate();
    old.enumerate();

    let layout = BlockDetector::new(&mut new, &mut old, &config, patterns).detect();
    assert_eq!(
        kinds(&layout),
        vec![
            (BlockKind::Insert, "d "),
            (BlockKind::Same, "a b c"),
            (BlockKind::Delete, " d e"),
            (BlockKind::Insert, " e"),
        ]
    );
    assert!(layout.groups.iter().all(|g| g.fixed));
}

#[test]
fn test_mark_before_first_fixed_block() {
    let mut config = DiffConfig::default();
    config.block_min_length(1);
    let layout = word_layout("bird cat dog", "cat dog bird", &config);
    assert_eq!(
        kinds(&layout),
        vec![
            (BlockKind::Mark, ""),
            (BlockKind::Delete, " "),
            (BlockKind::Same, "cat dog"),
            (BlockKind::Insert, " "),
            (BlockKind::Same, "bird"),
        ]
    );

    let mark = &layout.blocks[0];
    assert_eq!(mark.new_number, None);
    let mark_group = &layout.groups[mark.group.unwrap()];
    assert!(mark_group.fixed);
    assert_eq!(mark_group.block_start, 0);

    let moved = mark.moved.unwrap();
    assert_eq!(layout.groups[moved].moved_from, mark.group);
    assert_eq!(layout.blocks[4].group, Some(moved));
    assert_eq!(
        layout
            .blocks
            .iter()
            .filter(|b| b.kind == BlockKind::Mark)
            .count(),
        1
    );
}

#[cfg(test)]
fn unlink_layout(config: &DiffConfig) -> Layout<'static> {
    let patterns = Patterns::get();
    let mut old = TextVersion::new("the cat, a b c", patterns);
    let mut new = TextVersion::new("a b c the cat x,", patterns);
    old.split(Level::Word, None, patterns);
    new.split(Level::Word, None, patterns);
    let old_tokens = old.iter().collect::<Vec<_>>();
    let new_tokens = new.iter().collect::<Vec<_>>();
    let pairs = [
        (0, 5),
        (1, 6),
        (2, 7),
        (3, 8),
        (4, 9),
        (6, 0),
        (7, 1),
        (8, 2),
        (11, 3),
    ];
    for (i, j) in pairs {
        connect(&mut new, new_tokens[i], &mut old, old_tokens[j]);
    }
    // the comma keeps "the cat" from being unlinked as a whole
    new.tokens[new_tokens[11]].unique = true;
    old.tokens[old_tokens[3]].unique = true;
    new.enumerate();
    old.enumerate();
    BlockDetector::new(&mut new, &mut old, config, patterns).detect()
}

#[test]
fn test_unlinking_repeats_until_stable() {
    let layout = unlink_layout(&DiffConfig::default());
    let same = layout
        .blocks
        .iter()
        .filter(|b| b.kind == BlockKind::Same)
        .map(|b| b.text)
        .collect::<Vec<_>>();
    assert_eq!(same, vec!["a b c"]);
    assert_eq!(layout.new_text(), "a b c the cat x,");
    assert_eq!(layout.old_text(), "the cat, a b c");
}

#[test]
fn test_unlinking_stops_at_cycle_limit() {
    let mut config = DiffConfig::default();
    config.unlink_max(1);
    let layout = unlink_layout(&config);
    let same = layout
        .blocks
        .iter()
        .filter(|b| b.kind == BlockKind::Same)
        .map(|b| b.text)
        .collect::<Vec<_>>();
    assert_eq!(same, vec!["a b c", "the cat"]);
    assert!(layout
        .blocks
        .iter()
        .any(|b| b.kind == BlockKind::Delete && b.text == ", "));
}
