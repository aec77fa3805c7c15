use std::path::Path;
use crate::errors::Result;

/// write a `Qinit_YYYYMMDDtHH.csv` file: one discharge per line in `init_flows` order (the
/// caller is responsible for that order matching the connectivity file's row order). Atomic:
/// writes to a sibling temp path first, then renames over the destination.
pub fn write_qinit_file (path: impl AsRef<Path>, init_flows: &[f32]) -> Result<()> {
    let path = path.as_ref();
    let tmp = path.with_extension("tmp");

    let mut out = String::with_capacity(init_flows.len() * 8);
    for flow in init_flows {
        out.push_str(&flow.to_string());
        out.push('\n');
    }

    std::fs::write(&tmp, out)?;
    std::fs::rename(&tmp, path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_one_value_per_line_and_leaves_no_temp_file () {
        let path = std::env::temp_dir().join( format!("odin_rapid_assim_qinit_test_{}.csv", std::process::id()) );
        write_qinit_file(&path, &[1.5, 2.25, 0.0]).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!( contents, "1.5\n2.25\n0\n" );
        assert!( !path.with_extension("tmp").exists() );

        std::fs::remove_file(&path).ok();
    }
}
