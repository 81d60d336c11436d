use crate::error::Error;
use crate::host::{KeyValueStore, MemoryStore, PhotoData, Photoserv};
use std::cell::{Cell, RefCell};
use std::io::{self, Cursor, Read};
use std::rc::Rc;

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

/// In-memory host recording image requests and stream closes.
#[derive(Default)]
pub struct TestHost {
    pub store: MemoryStore,
    pub image: Option<Vec<u8>>,
    pub image_error: bool,
    pub requested_sizes: RefCell<Vec<String>>,
    pub closed_streams: Rc<Cell<usize>>,
}

impl TestHost {
    pub fn with_image(image: &[u8]) -> Self {
        TestHost {
            image: Some(image.to_vec()),
            ..TestHost::default()
        }
    }
}

struct TrackedStream {
    inner: Cursor<Vec<u8>>,
    closed: Rc<Cell<usize>>,
}

impl Read for TrackedStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.inner.read(buf)
    }
}

impl Drop for TrackedStream {
    fn drop(&mut self) {
        self.closed.set(self.closed.get() + 1);
    }
}

impl Photoserv for TestHost {
    fn get_photo_image(
        &self,
        _photo: &PhotoData,
        size: &str,
    ) -> Result<Option<Box<dyn Read>>, Error> {
        self.requested_sizes.borrow_mut().push(size.to_string());
        if self.image_error {
            return Err(io::Error::new(io::ErrorKind::NotFound, "image file missing").into());
        }
        Ok(self.image.clone().map(|bytes| {
            Box::new(TrackedStream {
                inner: Cursor::new(bytes),
                closed: Rc::clone(&self.closed_streams),
            }) as Box<dyn Read>
        }))
    }

    fn config(&self) -> &dyn KeyValueStore {
        &self.store
    }

    fn config_mut(&mut self) -> &mut dyn KeyValueStore {
        &mut self.store
    }
}
