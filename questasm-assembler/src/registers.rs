//! Register allocation for symbolic register names.
//!
//! Registers live in an arena; adjacency constraints from fixed register
//! sets are prev/next index links. Any two linked registers must end up
//! numbered consecutively (mod 256). Emission writes a placeholder byte and
//! records the offset; after `assign_all` every recorded offset is patched
//! with the resolved number.

use std::collections::BTreeMap;

use anyhow::Result;
use questasm::Error;

const NUM_SLOTS: usize = 0x100;

#[derive(Default)]
struct Register {
    name: Option<String>,
    number: Option<u8>,
    prev: Option<usize>,
    next: Option<usize>,
    patch_offsets: Vec<usize>,
}

pub(crate) struct RegisterAllocator {
    regs: Vec<Register>,
    by_name: BTreeMap<String, usize>,
    by_number: [Option<usize>; NUM_SLOTS],
}

impl Default for RegisterAllocator {
    fn default() -> Self {
        RegisterAllocator {
            regs: Vec::new(),
            by_name: BTreeMap::new(),
            by_number: [None; NUM_SLOTS],
        }
    }
}

impl RegisterAllocator {
    /// Finds or creates the register identified by name and/or number,
    /// binding whichever identity was previously missing.
    pub fn get_or_create(&mut self, name: Option<&str>, number: Option<u8>) -> Result<usize> {
        let mut found = name.and_then(|n| self.by_name.get(n).copied());
        if found.is_none() {
            if let Some(n) = number {
                found = self.by_number[n as usize];
            }
        }
        let idx = match found {
            Some(idx) => idx,
            None => {
                self.regs.push(Register::default());
                self.regs.len() - 1
            }
        };

        if let Some(n) = number {
            match self.regs[idx].number {
                None => {
                    if let Some(other) = self.by_number[n as usize] {
                        if other != idx {
                            return Err(Error::RegisterConflict(format!(
                                "register {} cannot take number {} already held by {}",
                                self.describe(idx),
                                n,
                                self.describe(other)
                            ))
                            .into());
                        }
                    }
                    self.regs[idx].number = Some(n);
                    self.by_number[n as usize] = Some(idx);
                }
                Some(existing) if existing != n => {
                    return Err(Error::RegisterConflict(format!(
                        "register {} is assigned multiple numbers ({} and {})",
                        self.describe(idx),
                        existing,
                        n
                    ))
                    .into());
                }
                _ => {}
            }
        }

        if let Some(requested) = name {
            match &self.regs[idx].name {
                None => {
                    self.regs[idx].name = Some(requested.to_string());
                    self.by_name.insert(requested.to_string(), idx);
                }
                Some(existing) if existing != requested => {
                    return Err(Error::RegisterConflict(format!(
                        "register number {:?} is assigned multiple names ({} and {})",
                        self.regs[idx].number, existing, requested
                    ))
                    .into());
                }
                _ => {}
            }
        }

        Ok(idx)
    }

    /// Requires `second` to be numbered exactly one above `first` (mod 256).
    pub fn constrain(&mut self, first: usize, second: usize) -> Result<()> {
        match self.regs[first].next {
            None => self.regs[first].next = Some(second),
            Some(existing) if existing != second => {
                return Err(Error::RegisterConflict(format!(
                    "register {} must come after {}, which is already followed by another register",
                    self.describe(second),
                    self.describe(first)
                ))
                .into());
            }
            _ => {}
        }
        match self.regs[second].prev {
            None => self.regs[second].prev = Some(first),
            Some(existing) if existing != first => {
                return Err(Error::RegisterConflict(format!(
                    "register {} must come before {}, which already follows another register",
                    self.describe(first),
                    self.describe(second)
                ))
                .into());
            }
            _ => {}
        }
        if let (Some(a), Some(b)) = (self.regs[first].number, self.regs[second].number) {
            if a != b.wrapping_sub(1) {
                return Err(Error::RegisterConflict(format!(
                    "registers {} and {} are pinned to non-consecutive numbers",
                    self.describe(first),
                    self.describe(second)
                ))
                .into());
            }
        }
        Ok(())
    }

    pub fn number_of(&self, idx: usize) -> Option<u8> {
        self.regs[idx].number
    }

    /// Records a code offset whose byte must be rewritten with this
    /// register's number after assignment.
    pub fn record_patch(&mut self, idx: usize, offset: usize) {
        self.regs[idx].patch_offsets.push(offset);
    }

    /// Numbers every named register: first by back-computing from a numbered
    /// neighbor along the constraint chain, otherwise by placing the whole
    /// chain in the first free contiguous window.
    pub fn assign_all(&mut self) -> Result<()> {
        let unassigned: Vec<usize> = self
            .by_name
            .values()
            .copied()
            .filter(|&idx| self.regs[idx].number.is_none())
            .collect();

        for idx in unassigned {
            if self.regs[idx].number.is_some() {
                continue;
            }

            let (forward_hit, next_delta) = self.walk(idx, |reg| reg.next)?;
            if let Some(number) = forward_hit {
                self.assign_number(idx, number.wrapping_sub(next_delta as u8))?;
                continue;
            }
            let (backward_hit, prev_delta) = self.walk(idx, |reg| reg.prev)?;
            if let Some(number) = backward_hit {
                self.assign_number(idx, number.wrapping_add(prev_delta as u8))?;
                continue;
            }

            // Whole chain is unpinned; the walks measured its extent.
            let chain_len = prev_delta + next_delta - 1;
            let base = self.find_free_window(chain_len)?;
            self.assign_number(idx, base.wrapping_add(prev_delta as u8 - 1))?;
        }

        for (name, &idx) in &self.by_name {
            if self.regs[idx].number.is_none() {
                return Err(
                    Error::RegisterConflict(format!("register {} was not assigned", name)).into(),
                );
            }
        }
        for (slot, entry) in self.by_number.iter().enumerate() {
            if let Some(idx) = entry {
                debug_assert_eq!(self.regs[*idx].number, Some(slot as u8));
            }
        }
        Ok(())
    }

    /// Rewrites every recorded offset with its register's assigned number.
    pub fn patch(&self, code: &mut [u8]) {
        for reg in &self.regs {
            let Some(number) = reg.number else { continue };
            for &offset in &reg.patch_offsets {
                code[offset] = number;
            }
        }
    }

    /// Follows links from `idx`, returning the first pinned number found and
    /// the distance walked (or the chain extent plus one when none is).
    fn walk(
        &self,
        idx: usize,
        step: impl Fn(&Register) -> Option<usize>,
    ) -> Result<(Option<u8>, usize)> {
        let mut delta = 1usize;
        let mut cursor = step(&self.regs[idx]);
        while let Some(next) = cursor {
            if delta > NUM_SLOTS {
                return Err(Error::RegisterConflict(
                    "register constraint chain is longer than the register space".to_string(),
                )
                .into());
            }
            if let Some(number) = self.regs[next].number {
                return Ok((Some(number), delta));
            }
            cursor = step(&self.regs[next]);
            delta += 1;
        }
        Ok((None, delta))
    }

    fn assign_number(&mut self, idx: usize, number: u8) -> Result<()> {
        match self.regs[idx].number {
            None => {
                if self.by_number[number as usize].is_some() {
                    return Err(Error::RegisterConflict(format!(
                        "register number {} assigned multiple times",
                        number
                    ))
                    .into());
                }
                self.regs[idx].number = Some(number);
                self.by_number[number as usize] = Some(idx);
                Ok(())
            }
            Some(existing) if existing != number => Err(Error::RegisterConflict(format!(
                "assigning register number {} over existing number {}",
                number, existing
            ))
            .into()),
            _ => Ok(()),
        }
    }

    fn find_free_window(&self, len: usize) -> Result<u8> {
        if len <= NUM_SLOTS {
            for base in 0..=(NUM_SLOTS - len) {
                if (base..base + len).all(|slot| self.by_number[slot].is_none()) {
                    return Ok(base as u8);
                }
            }
        }
        Err(Error::RegisterConflict("not enough space to assign registers".to_string()).into())
    }

    fn describe(&self, idx: usize) -> String {
        let reg = &self.regs[idx];
        match (&reg.name, reg.number) {
            (Some(name), Some(number)) => format!("{}@{}", name, number),
            (Some(name), None) => name.clone(),
            (None, Some(number)) => format!("r{}", number),
            (None, None) => "<anonymous>".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pinned_registers_are_respected() {
        let mut alloc = RegisterAllocator::default();
        let a = alloc.get_or_create(Some("a"), Some(10)).unwrap();
        alloc.assign_all().unwrap();
        assert_eq!(alloc.number_of(a), Some(10));
    }

    #[test]
    fn chain_backfills_from_pinned_tail() {
        let mut alloc = RegisterAllocator::default();
        let a = alloc.get_or_create(Some("a"), None).unwrap();
        let b = alloc.get_or_create(Some("b"), None).unwrap();
        let c = alloc.get_or_create(Some("c"), Some(50)).unwrap();
        alloc.constrain(a, b).unwrap();
        alloc.constrain(b, c).unwrap();
        alloc.assign_all().unwrap();
        assert_eq!(alloc.number_of(a), Some(48));
        assert_eq!(alloc.number_of(b), Some(49));
        assert_eq!(alloc.number_of(c), Some(50));
    }

    #[test]
    fn unpinned_chain_finds_contiguous_window() {
        let mut alloc = RegisterAllocator::default();
        // Occupy the low slots so the chain cannot start at zero.
        alloc.get_or_create(None, Some(0)).unwrap();
        alloc.get_or_create(None, Some(2)).unwrap();
        let a = alloc.get_or_create(Some("a"), None).unwrap();
        let b = alloc.get_or_create(Some("b"), None).unwrap();
        let c = alloc.get_or_create(Some("c"), None).unwrap();
        alloc.constrain(a, b).unwrap();
        alloc.constrain(b, c).unwrap();
        alloc.assign_all().unwrap();
        let base = alloc.number_of(a).unwrap();
        assert_eq!(base, 3);
        assert_eq!(alloc.number_of(b), Some(base + 1));
        assert_eq!(alloc.number_of(c), Some(base + 2));
    }

    #[test]
    fn conflicting_pins_fail() {
        let mut alloc = RegisterAllocator::default();
        alloc.get_or_create(Some("a"), Some(5)).unwrap();
        assert!(alloc.get_or_create(Some("a"), Some(6)).is_err());
        assert!(alloc.get_or_create(Some("b"), Some(5)).is_err());
    }

    #[test]
    fn non_consecutive_pins_fail_constraint() {
        let mut alloc = RegisterAllocator::default();
        let a = alloc.get_or_create(Some("a"), Some(5)).unwrap();
        let b = alloc.get_or_create(Some("b"), Some(9)).unwrap();
        assert!(alloc.constrain(a, b).is_err());
    }

    #[test]
    fn exhaustion_is_detected() {
        let mut alloc = RegisterAllocator::default();
        for slot in 0..=0xFF {
            alloc.get_or_create(None, Some(slot)).unwrap();
        }
        let a = alloc.get_or_create(Some("a"), None).unwrap();
        let _ = a;
        assert!(alloc.assign_all().is_err());
    }

    #[test]
    fn patches_recorded_offsets() {
        let mut alloc = RegisterAllocator::default();
        let a = alloc.get_or_create(Some("a"), Some(0x42)).unwrap();
        alloc.record_patch(a, 1);
        alloc.record_patch(a, 3);
        alloc.assign_all().unwrap();
        let mut code = vec![0xFF; 4];
        alloc.patch(&mut code);
        assert_eq!(code, vec![0xFF, 0x42, 0xFF, 0x42]);
    }
}
