//! Mock version of an output file, used to simulate a failing destination.
use mockall::mock;

use std::io::{self, ErrorKind, Write};

mock! {
    pub File {}
    impl Write for File {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize>;
        fn flush(&mut self) -> io::Result<()>;
    }
}

/// A file whose writes always fail, as on a full disk.
#[allow(dead_code)]
pub fn full_disk_file() -> MockFile {
    let mut file = MockFile::default();
    file.expect_write()
        .returning(|_| Err(io::Error::new(ErrorKind::StorageFull, "no space left on device")));
    file.expect_flush().returning(|| Ok(()));
    file
}
