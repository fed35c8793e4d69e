use hashbrown::HashMap;
use log::debug;

use crate::disc::boundary::BoundaryPosition;
use crate::disc::geometric::Geometric2D;

#[derive(Clone, Debug)]
pub struct Node {
    pub x: f64,
    pub y: f64,
    pub parents: Vec<usize>,
    pub local_ids: Vec<usize>,
}
#[derive(Clone, Debug)]
pub struct Edge {
    pub inodes: [usize; 2],
    pub parents: Vec<usize>,
    pub local_ids: Vec<usize>,
    pub boundary: Option<BoundaryPosition>,
}
impl Edge {
    pub fn is_boundary(&self) -> bool {
        self.parents.len() == 1
    }
}
pub trait Element2d: Geometric2D + std::fmt::Debug {
    fn inodes(&self) -> &[usize];
}
#[derive(Clone, Debug)]
pub struct QuadrilateralElement {
    pub inodes: [usize; 4],
}
impl Geometric2D for QuadrilateralElement {}
impl Element2d for QuadrilateralElement {
    fn inodes(&self) -> &[usize] {
        &self.inodes
    }
}
#[derive(Clone, Debug)]
pub struct Mesh2d<T: Element2d> {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
    pub elements: Vec<T>,
    pub internal_edges: Vec<usize>,
    pub boundary_edges: Vec<usize>,
    pub elem_num: usize,
    pub node_num: usize,
}
impl<T: Element2d> Mesh2d<T> {
    pub fn element_coords(&self, ielem: usize) -> ([f64; 4], [f64; 4]) {
        let inodes = self.elements[ielem].inodes();
        let x: [f64; 4] = std::array::from_fn(|i| self.nodes[inodes[i]].x);
        let y: [f64; 4] = std::array::from_fn(|i| self.nodes[inodes[i]].y);
        (x, y)
    }
}
impl Mesh2d<QuadrilateralElement> {
    /// Structured `n[0] x n[1]` quadrilateral mesh of the rectangle spanned by
    /// the corners `a` and `b`.
    pub fn create_rect_mesh(a: [f64; 2], b: [f64; 2], n: [usize; 2]) -> Self {
        let [nx, ny] = n;
        assert!(nx > 0 && ny > 0, "mesh needs at least one element per direction");
        let node_id = |i: usize, j: usize| j * (nx + 1) + i;

        let mut nodes = Vec::with_capacity((nx + 1) * (ny + 1));
        for j in 0..=ny {
            for i in 0..=nx {
                nodes.push(Node {
                    x: a[0] + (b[0] - a[0]) * i as f64 / nx as f64,
                    y: a[1] + (b[1] - a[1]) * j as f64 / ny as f64,
                    parents: Vec::new(),
                    local_ids: Vec::new(),
                });
            }
        }

        let mut elements = Vec::with_capacity(nx * ny);
        let mut edges: Vec<Edge> = Vec::new();
        let mut edge_lookup: HashMap<(usize, usize), usize> = HashMap::new();
        for j in 0..ny {
            for i in 0..nx {
                let ielem = elements.len();
                let inodes = [
                    node_id(i, j),
                    node_id(i + 1, j),
                    node_id(i + 1, j + 1),
                    node_id(i, j + 1),
                ];
                for (local_id, &inode) in inodes.iter().enumerate() {
                    nodes[inode].parents.push(ielem);
                    nodes[inode].local_ids.push(local_id);
                }
                for local_id in 0..4 {
                    let n0 = inodes[local_id];
                    let n1 = inodes[(local_id + 1) % 4];
                    let key = (n0.min(n1), n0.max(n1));
                    let iedge = *edge_lookup.entry(key).or_insert_with(|| {
                        edges.push(Edge {
                            inodes: [n0, n1],
                            parents: Vec::new(),
                            local_ids: Vec::new(),
                            boundary: None,
                        });
                        edges.len() - 1
                    });
                    edges[iedge].parents.push(ielem);
                    edges[iedge].local_ids.push(local_id);
                }
                elements.push(QuadrilateralElement { inodes });
            }
        }

        let mut internal_edges = Vec::new();
        let mut boundary_edges = Vec::new();
        for (iedge, edge) in edges.iter_mut().enumerate() {
            if edge.is_boundary() {
                edge.boundary = Some(match edge.local_ids[0] {
                    0 => BoundaryPosition::Lower,
                    1 => BoundaryPosition::Right,
                    2 => BoundaryPosition::Upper,
                    _ => BoundaryPosition::Left,
                });
                boundary_edges.push(iedge);
            } else {
                internal_edges.push(iedge);
            }
        }
        debug!(
            "rectangular mesh: {} elements, {} internal edges, {} boundary edges",
            elements.len(),
            internal_edges.len(),
            boundary_edges.len()
        );
        Mesh2d {
            node_num: nodes.len(),
            elem_num: elements.len(),
            nodes,
            edges,
            elements,
            internal_edges,
            boundary_edges,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn side_count(mesh: &Mesh2d<QuadrilateralElement>, position: BoundaryPosition) -> usize {
        mesh.edges
            .iter()
            .filter(|edge| edge.boundary == Some(position))
            .count()
    }

    #[test]
    fn test_rect_mesh_counts() {
        let mesh = Mesh2d::create_rect_mesh([-5.0, -5.0], [5.0, 5.0], [4, 3]);
        assert_eq!(mesh.elem_num, 12);
        assert_eq!(mesh.node_num, 20);
        assert_eq!(mesh.edges.len(), 4 * 4 + 3 * 5);
        assert_eq!(mesh.boundary_edges.len(), 2 * (4 + 3));
        assert_eq!(mesh.internal_edges.len(), mesh.edges.len() - 14);
        assert_eq!(side_count(&mesh, BoundaryPosition::Lower), 4);
        assert_eq!(side_count(&mesh, BoundaryPosition::Upper), 4);
        assert_eq!(side_count(&mesh, BoundaryPosition::Left), 3);
        assert_eq!(side_count(&mesh, BoundaryPosition::Right), 3);
    }

    #[test]
    fn test_boundary_edges_lie_on_domain_sides() {
        let mesh = Mesh2d::create_rect_mesh([0.0, 0.0], [2.0, 1.0], [3, 2]);
        for &iedge in &mesh.boundary_edges {
            let edge = &mesh.edges[iedge];
            for &inode in &edge.inodes {
                let node = &mesh.nodes[inode];
                match edge.boundary {
                    Some(BoundaryPosition::Lower) => assert_eq!(node.y, 0.0),
                    Some(BoundaryPosition::Right) => assert_eq!(node.x, 2.0),
                    Some(BoundaryPosition::Upper) => assert_eq!(node.y, 1.0),
                    Some(BoundaryPosition::Left) => assert_eq!(node.x, 0.0),
                    None => panic!("boundary edge {iedge} has no position"),
                }
            }
        }
        for &iedge in &mesh.internal_edges {
            assert_eq!(mesh.edges[iedge].boundary, None);
            assert_eq!(mesh.edges[iedge].parents.len(), 2);
        }
    }

    #[test]
    fn test_elements_are_counter_clockwise() {
        let mesh = Mesh2d::create_rect_mesh([0.0, 0.0], [1.0, 1.0], [2, 2]);
        for ielem in 0..mesh.elem_num {
            let (x, y) = mesh.element_coords(ielem);
            let (jacob_det, _) = QuadrilateralElement::evaluate_jacob(0.0, 0.0, &x, &y);
            // reference square has area 4, each element 0.25
            assert!((jacob_det - 0.0625).abs() < 1e-14, "element {ielem} has jacobian {jacob_det}");
        }
    }
}
