//! Cleartext signing through a cryptography library loaded on first use.
//!
//! The library is loaded at most once per page: concurrent callers share one
//! initialization future. A failed load is forgotten so the next call retries.

use std::cell::RefCell;
use std::rc::Rc;

use futures::future::{FutureExt, LocalBoxFuture, Shared};

use crate::error::ForumError;

/// Operations needed from an OpenPGP implementation.
#[allow(async_fn_in_trait)]
pub trait CryptoLibrary {
    type Key;

    async fn read_armored_key(&self, armored: &str) -> Result<Self::Key, ForumError>;
    /// Unlock the key in place.
    async fn decrypt_key(&self, key: &Self::Key, passphrase: &str) -> Result<(), ForumError>;
    /// Produce an armored cleartext-signed message.
    async fn sign_cleartext(&self, key: &Self::Key, text: &str) -> Result<String, ForumError>;
}

/// Fetches and initializes a [`CryptoLibrary`].
pub trait LibraryLoader {
    type Library: CryptoLibrary + 'static;

    fn load(&self) -> LocalBoxFuture<'static, Result<Rc<Self::Library>, ForumError>>;
}

type LoadFuture<T> = Shared<LocalBoxFuture<'static, Result<Rc<T>, ForumError>>>;

pub struct LazyLibrary<L: LibraryLoader> {
    loader: L,
    init: RefCell<Option<LoadFuture<L::Library>>>,
}

impl<L: LibraryLoader> LazyLibrary<L> {
    pub fn new(loader: L) -> Self {
        Self {
            loader,
            init: RefCell::new(None),
        }
    }

    /// Whether a load has completed successfully.
    pub fn is_loaded(&self) -> bool {
        self.init
            .borrow()
            .as_ref()
            .and_then(|fut| fut.peek())
            .is_some_and(|res| res.is_ok())
    }

    pub async fn get(&self) -> Result<Rc<L::Library>, ForumError> {
        let fut = {
            let mut slot = self.init.borrow_mut();
            slot.get_or_insert_with(|| {
                tracing::info!("Loading crypto library");
                self.loader.load().shared()
            })
            .clone()
        };
        let result = fut.await;
        if let Err(e) = &result {
            tracing::warn!("Crypto library load failed: {e}");
            let mut slot = self.init.borrow_mut();
            if slot.as_ref().and_then(|f| f.peek()).is_some_and(|r| r.is_err()) {
                *slot = None;
            }
        }
        result
    }

    /// Sign `text` with an armored private key.
    ///
    /// A passphrase that fails to unlock the key is ignored and signing is
    /// attempted anyway, which succeeds for keys that are not encrypted.
    pub async fn sign_text(
        &self,
        armored_key: &str,
        passphrase: &str,
        text: &str,
    ) -> Result<String, ForumError> {
        let lib = self.get().await?;
        let key = lib.read_armored_key(armored_key).await?;
        if let Err(e) = lib.decrypt_key(&key, passphrase).await {
            tracing::warn!("Key decryption failed, signing with key as-is: {e}");
        }
        lib.sign_cleartext(&key, text).await
    }
}
