use arch::inst::{Inst, Label};
use bimap::BiMap;

/// Monotonic label source shared by every method of one compilation
#[derive(Debug, Default)]
pub struct LabelGen {
    next: usize,
}

impl LabelGen {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fresh(&mut self) -> Label {
        let label = Label(format!("L{:04}", self.next));
        self.next += 1;
        label
    }
}

/// Label -> index of its `Inst::Label` in `code`
pub fn index(code: &[Inst]) -> BiMap<Label, usize> {
    code.iter()
        .enumerate()
        .filter_map(|(idx, inst)| match inst {
            Inst::Label(label) => Some((label.clone(), idx)),
            _ => None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_is_unique() {
        let mut labels = LabelGen::new();
        assert_eq!(labels.fresh(), Label("L0000".into()));
        assert_eq!(labels.fresh(), Label("L0001".into()));
    }

    #[test]
    fn index_positions() {
        let code = vec![
            Inst::Label(Label("L0000".into())),
            Inst::Pop,
            Inst::Label(Label("L0001".into())),
        ];
        let map = index(&code);
        assert_eq!(map.get_by_left(&Label("L0001".into())), Some(&2));
        assert_eq!(map.get_by_right(&0), Some(&Label("L0000".into())));
    }
}
