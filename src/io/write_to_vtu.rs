use std::fs;
use std::path::{Path, PathBuf};

use ndarray::ArrayView2;
use vtkio::{
    Vtk,
    model::{
        Attribute, Attributes, ByteOrder, CellType, Cells, DataArray, DataSet, ElementType,
        IOBuffer, UnstructuredGridPiece, Version, VertexNumbers,
    },
};

use crate::disc::dg_quad::DgQuadDiscretization;
use crate::io::IoError;

/// A named point field, shape `(n_components, n_volume_points)`.
pub struct SnapshotField<'a> {
    pub name: &'a str,
    pub data: ArrayView2<'a, f64>,
}

/// Writes nodal snapshots, one `.vtu` per call, into `output_dir`.
pub struct VtuWriter {
    output_dir: PathBuf,
    casename: String,
}
impl VtuWriter {
    pub fn new<P: AsRef<Path>>(output_dir: P, casename: &str) -> Result<Self, IoError> {
        let output_dir = output_dir.as_ref().to_path_buf();
        fs::create_dir_all(&output_dir).map_err(|source| IoError::CreateDir {
            path: output_dir.clone(),
            source,
        })?;
        Ok(Self {
            output_dir,
            casename: casename.to_string(),
        })
    }
    pub fn snapshot_path(&self, step: usize) -> PathBuf {
        self.output_dir
            .join(format!("{}-{:06}.vtu", self.casename, step))
    }
    /// Every element is split into `order^2` linear quads on its GLL nodes, so
    /// the high-order field is drawn without interpolation.
    pub fn write_snapshot(
        &self,
        disc: &DgQuadDiscretization,
        step: usize,
        fields: &[SnapshotField],
    ) -> Result<PathBuf, IoError> {
        let filename = self.snapshot_path(step);
        let npts = disc.x.len();

        let mut vtk_points = Vec::with_capacity(3 * npts);
        for (&x, &y) in disc.x.iter().zip(disc.y.iter()) {
            vtk_points.extend([x, y, 0.0]);
        }
        let connectivity = sub_quad_connectivity(disc.num_elements(), disc.order());
        let num_cells = connectivity.len() / 4;

        let mut point_data = Vec::with_capacity(fields.len());
        for field in fields {
            if field.data.ncols() != npts {
                return Err(IoError::Vtu {
                    path: filename,
                    message: format!(
                        "field {} has {} points, mesh has {}",
                        field.name,
                        field.data.ncols(),
                        npts
                    ),
                });
            }
            // vtk wants components interleaved per point
            let values: Vec<f64> = field.data.t().iter().copied().collect();
            point_data.push(Attribute::DataArray(DataArray {
                name: field.name.to_string(),
                elem: ElementType::Scalars {
                    num_comp: field.data.nrows() as u32,
                    lookup_table: None,
                },
                data: IOBuffer::F64(values),
            }));
        }

        let vtk_file = Vtk {
            version: Version::XML { major: 1, minor: 0 },
            title: format!("{} step {}", self.casename, step),
            byte_order: ByteOrder::native(),
            data: DataSet::inline(UnstructuredGridPiece {
                points: IOBuffer::F64(vtk_points),
                cells: Cells {
                    cell_verts: VertexNumbers::XML {
                        connectivity,
                        offsets: (0..num_cells).map(|i| ((i + 1) * 4) as u64).collect(),
                    },
                    types: vec![CellType::Quad; num_cells],
                },
                data: Attributes {
                    point: point_data,
                    cell: vec![],
                },
            }),
            file_path: None,
        };
        vtk_file.export(&filename).map_err(|e| IoError::Vtu {
            path: filename.clone(),
            message: format!("{e:?}"),
        })?;
        log::debug!("wrote {}", filename.display());
        Ok(filename)
    }
}

/// Counter-clockwise linear sub-quads over the r-fastest node grid of each element.
fn sub_quad_connectivity(num_elements: usize, order: usize) -> Vec<u64> {
    let nfp = order + 1;
    let np = nfp * nfp;
    let mut connectivity = Vec::with_capacity(num_elements * order * order * 4);
    for ielem in 0..num_elements {
        let base = ielem * np;
        for j in 0..order {
            for i in 0..order {
                let lower = base + j * nfp + i;
                let upper = base + (j + 1) * nfp + i;
                connectivity.extend([lower, lower + 1, upper + 1, upper].map(|v| v as u64));
            }
        }
    }
    connectivity
}
