use std::fs::File;
use std::path::Path;

use anyhow::{anyhow, Result};
use ndarray::{arr0, Array4};
use ndarray_npy::NpzWriter;

/// The input and label tensors of one split, in example-channel-height-width
/// order.
#[derive(Debug)]
pub struct SplitTensors {
    pub x: Array4<f32>,
    pub y: Array4<f32>,
}

/// Scalar shape metadata stored alongside the tensors, taken from the
/// assembled arrays rather than from configuration.
#[derive(Debug, Clone, Copy)]
pub struct DatasetAttributes {
    pub input_bands: i64,
    pub output_bands: i64,
    pub input_size: i64,
    pub output_size: i64,
}

/// Persists the six tensors and the shape attributes into a single `.npz`
/// archive. The attributes are stored as named zero-dimensional arrays. The
/// archive is finished (flushed) before returning; a file left behind by a
/// failed write is not cleaned up and must not be trusted.
pub fn write_dataset(
    path: &Path,
    train: &SplitTensors,
    validation: &SplitTensors,
    test: &SplitTensors,
    attributes: &DatasetAttributes,
) -> Result<()> {
    let file = File::create(path)
        .map_err(|e| anyhow!("Failed to create output file {:?}: {}", path, e))?;
    let mut npz = NpzWriter::new(file);

    npz.add_array("X_train", &train.x)?;
    npz.add_array("y_train", &train.y)?;
    npz.add_array("X_val", &validation.x)?;
    npz.add_array("y_val", &validation.y)?;
    npz.add_array("X_test", &test.x)?;
    npz.add_array("y_test", &test.y)?;

    npz.add_array("input_bands", &arr0(attributes.input_bands))?;
    npz.add_array("output_bands", &arr0(attributes.output_bands))?;
    npz.add_array("input_size", &arr0(attributes.input_size))?;
    npz.add_array("output_size", &arr0(attributes.output_size))?;

    npz.finish()
        .map_err(|e| anyhow!("Failed to write output file {:?}: {}", path, e))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{Array0, Array4};
    use ndarray_npy::NpzReader;

    fn tensors(n: usize, bands: usize, size: usize, fill: f32) -> SplitTensors {
        SplitTensors {
            x: Array4::from_elem((n, bands, size, size), fill),
            y: Array4::from_elem((n, 2, size, size), fill / 2.0),
        }
    }

    #[test]
    fn arrays_and_attributes_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dataset.npz");

        let attributes = DatasetAttributes {
            input_bands: 3,
            output_bands: 2,
            input_size: 4,
            output_size: 4,
        };
        write_dataset(
            &path,
            &tensors(5, 3, 4, 1.0),
            &tensors(2, 3, 4, 2.0),
            &tensors(1, 3, 4, 3.0),
            &attributes,
        )
        .unwrap();

        let mut npz = NpzReader::new(File::open(&path).unwrap()).unwrap();

        let x_train: Array4<f32> = npz.by_name("X_train.npy").unwrap();
        assert_eq!(x_train.dim(), (5, 3, 4, 4));
        assert!(x_train.iter().all(|&v| v == 1.0));

        let y_val: Array4<f32> = npz.by_name("y_val.npy").unwrap();
        assert_eq!(y_val.dim(), (2, 2, 4, 4));
        assert!(y_val.iter().all(|&v| v == 1.0));

        let x_test: Array4<f32> = npz.by_name("X_test.npy").unwrap();
        assert_eq!(x_test.dim(), (1, 3, 4, 4));
        assert!(x_test.iter().all(|&v| v == 3.0));

        let input_bands: Array0<i64> = npz.by_name("input_bands.npy").unwrap();
        assert_eq!(input_bands.into_scalar(), 3);
        let output_size: Array0<i64> = npz.by_name("output_size.npy").unwrap();
        assert_eq!(output_size.into_scalar(), 4);
    }

    #[test]
    fn empty_splits_are_written_with_zero_length() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dataset.npz");

        let attributes = DatasetAttributes {
            input_bands: 1,
            output_bands: 1,
            input_size: 2,
            output_size: 2,
        };
        write_dataset(
            &path,
            &tensors(3, 1, 2, 1.0),
            &tensors(0, 1, 2, 0.0),
            &tensors(0, 1, 2, 0.0),
            &attributes,
        )
        .unwrap();

        let mut npz = NpzReader::new(File::open(&path).unwrap()).unwrap();
        let x_val: Array4<f32> = npz.by_name("X_val.npy").unwrap();
        assert_eq!(x_val.dim(), (0, 1, 2, 2));
    }

    #[test]
    fn an_unwritable_destination_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("no-such-dir").join("dataset.npz");

        let attributes = DatasetAttributes {
            input_bands: 1,
            output_bands: 1,
            input_size: 2,
            output_size: 2,
        };
        let result = write_dataset(
            &path,
            &tensors(1, 1, 2, 1.0),
            &tensors(0, 1, 2, 0.0),
            &tensors(0, 1, 2, 0.0),
            &attributes,
        );
        assert!(result.is_err());
    }
}
