//! 包含関係から構築されるタクソノミー

use crate::expr::ExprId;
use std::collections::{BTreeSet, HashMap};

/// Partial order over a fixed element set, with synonyms collapsed into
/// vertices. Always has a top and a bottom vertex.
#[derive(Debug, Clone)]
pub(crate) struct Taxonomy {
    vertices: Vec<Vec<ExprId>>,
    vertex_of: HashMap<ExprId, usize>,
    /// Strict ancestors per vertex
    above: Vec<BTreeSet<usize>>,
    pub bottom: usize,
}

impl Taxonomy {
    pub fn build(
        elements: impl IntoIterator<Item = ExprId>,
        top: ExprId,
        bottom: ExprId,
        leq: impl Fn(ExprId, ExprId) -> bool,
    ) -> Self {
        let mut ordered: Vec<ExprId> = vec![top, bottom];
        for element in elements {
            if !ordered.contains(&element) {
                ordered.push(element);
            }
        }

        let mut vertices: Vec<Vec<ExprId>> = Vec::new();
        let mut vertex_of = HashMap::new();
        for element in ordered {
            let existing = vertices
                .iter()
                .position(|members| leq(element, members[0]) && leq(members[0], element));
            let index = match existing {
                Some(index) => {
                    vertices[index].push(element);
                    index
                }
                None => {
                    vertices.push(vec![element]);
                    vertices.len() - 1
                }
            };
            vertex_of.insert(element, index);
        }

        let above = (0..vertices.len())
            .map(|v| {
                (0..vertices.len())
                    .filter(|w| *w != v && leq(vertices[v][0], vertices[*w][0]))
                    .collect()
            })
            .collect();

        for members in &mut vertices {
            members.sort();
        }

        Self {
            bottom: vertex_of.get(&bottom).copied().unwrap_or(1),
            vertices,
            vertex_of,
            above,
        }
    }

    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    pub fn vertex(&self, element: ExprId) -> Option<usize> {
        self.vertex_of.get(&element).copied()
    }

    pub fn members(&self, vertex: usize) -> &[ExprId] {
        &self.vertices[vertex]
    }

    /// w ≥ v strictly
    pub fn is_above(&self, v: usize, w: usize) -> bool {
        self.above[v].contains(&w)
    }

    pub fn supers(&self, vertex: usize, direct: bool) -> Vec<usize> {
        let all = self.above[vertex].clone();
        if direct {
            self.minimal(&all)
        } else {
            all.into_iter().collect()
        }
    }

    pub fn subs(&self, vertex: usize, direct: bool) -> Vec<usize> {
        let all: BTreeSet<usize> = (0..self.len()).filter(|w| self.is_above(*w, vertex)).collect();
        if direct {
            self.maximal(&all)
        } else {
            all.into_iter().collect()
        }
    }

    /// Lowest vertices of `set`
    pub fn minimal(&self, set: &BTreeSet<usize>) -> Vec<usize> {
        set.iter()
            .copied()
            .filter(|w| !set.iter().any(|u| self.is_above(*u, *w)))
            .collect()
    }

    /// Highest vertices of `set`
    pub fn maximal(&self, set: &BTreeSet<usize>) -> Vec<usize> {
        set.iter()
            .copied()
            .filter(|w| !set.iter().any(|u| self.is_above(*w, *u)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::ExpressionManager;
    use shoin_core::Iri;

    #[test]
    fn test_direct_levels_and_synonyms() {
        let mut em = ExpressionManager::new();
        let a = em.concept(Iri::new("http://example.org/A"));
        let b = em.concept(Iri::new("http://example.org/B"));
        let b2 = em.concept(Iri::new("http://example.org/B2"));
        let c = em.concept(Iri::new("http://example.org/C"));

        // C ⊑ B ≡ B2 ⊑ A
        let rank = |x: ExprId| -> u8 {
            match x {
                _ if x == ExprId::TOP => 0,
                _ if x == a => 1,
                _ if x == b || x == b2 => 2,
                _ if x == c => 3,
                _ => 4,
            }
        };
        let taxonomy = Taxonomy::build([a, b, b2, c], ExprId::TOP, ExprId::BOTTOM, |x, y| rank(x) >= rank(y));

        let vb = taxonomy.vertex(b).unwrap();
        assert_eq!(taxonomy.members(vb), &[b, b2]);
        let direct_supers: Vec<&[ExprId]> = taxonomy.supers(vb, true).into_iter().map(|v| taxonomy.members(v)).collect();
        assert_eq!(direct_supers, vec![&[a][..]]);
        assert_eq!(taxonomy.supers(vb, false).len(), 2);

        let vc = taxonomy.vertex(c).unwrap();
        assert_eq!(taxonomy.subs(vc, true), vec![taxonomy.bottom]);
        assert_eq!(taxonomy.subs(taxonomy.vertex(ExprId::TOP).unwrap(), true), vec![taxonomy.vertex(a).unwrap()]);
    }
}
