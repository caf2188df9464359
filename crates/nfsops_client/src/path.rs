//! Path and directory utilities layered over the raw procedures:
//! path-to-handle resolution, whole-directory reads, recursive subtree
//! removal, lookup-or-create, and the reverse handle-to-path walk.

use std::collections::{HashMap, HashSet};
use std::pin::Pin;

use nfsops_types::mount::dirpath;
use nfsops_types::nfs3::{
    LOOKUP3args, MKDIR3args, Nfs3Result, READDIR3args, READDIRPLUS3args, REMOVE3args, RMDIR3args,
    cookieverf3, diropargs3, entry3, entryplus3, filename3, nfs_fh3, nfsstat3, sattr3,
};

use crate::error::Error;
use crate::mount::MountClient;
use crate::net::Connector;
use crate::nfs::Nfs3Client;

/// READDIR/READDIRPLUS page size used when draining a directory.
const DIR_PAGE_BYTES: u32 = 16 * 1024;

/// Entries that are never descended into when removing a subtree.
const SKIPPED_NAMES: [&[u8]; 3] = [b".", b"..", b".snapshot"];

/// Resolves an absolute path to a handle: MOUNT "/" for the root, then
/// one LOOKUP per component.
pub async fn resolve_path<C: Connector>(
    mnt: &mut MountClient<C>,
    cli: &mut Nfs3Client<C>,
    path: &str,
) -> Result<nfs_fh3, Error> {
    resolve_path_from(mnt, cli, None, path).await
}

/// Resolves `path` starting from `from`. Without a starting handle the
/// path must be absolute; with one it must be relative.
pub async fn resolve_path_from<C: Connector>(
    mnt: &mut MountClient<C>,
    cli: &mut Nfs3Client<C>,
    from: Option<&nfs_fh3>,
    path: &str,
) -> Result<nfs_fh3, Error> {
    if path.is_empty() {
        return Err(Error::InvalidPath(path.to_owned()));
    }

    let (mut fh, remainder) = match from {
        None => {
            if !path.starts_with('/') {
                return Err(Error::InvalidPath(format!(
                    "cannot resolve relative path {path:?} without a starting handle"
                )));
            }
            let root = mnt.root_handle().await?;
            if path == "/" {
                return Ok(root);
            }
            (root, &path[1..])
        }
        Some(fh) => {
            if path.starts_with('/') {
                return Err(Error::InvalidPath(format!(
                    "absolute path {path:?} cannot start from a handle"
                )));
            }
            (fh.clone(), path)
        }
    };

    for component in remainder.split('/') {
        if component.is_empty() {
            return Err(Error::InvalidPath(path.to_owned()));
        }
        let args = LOOKUP3args {
            what: diropargs3 {
                dir: fh,
                name: filename3::from(component.as_bytes()),
            },
        };
        match cli.lookup(&args).await? {
            Nfs3Result::Ok(ok) => fh = ok.object,
            Nfs3Result::Err((status, _)) => {
                tracing::error!(component, %status, "path resolution failed");
                return Err(Error::PathResolution {
                    component: component.to_owned(),
                    status,
                });
            }
        }
    }
    Ok(fh)
}

/// The outcome of a reverse (handle to path) walk. `complete` is false
/// when the walk stopped early; `path` then holds the best suffix found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPath {
    pub path: String,
    pub complete: bool,
}

/// Maps a handle back to a path by walking `..` upwards and scanning
/// each parent for the child's name, until an export root is reached.
/// Cycles are broken with a visited set; on servers where `..` does not
/// resolve or the parent listing omits the child, the best partial path
/// is returned with `complete == false`.
pub async fn path_from_handle<C: Connector>(
    mnt: &mut MountClient<C>,
    cli: &mut Nfs3Client<C>,
    fh: &nfs_fh3,
) -> Result<ResolvedPath, Error> {
    let exports = export_roots(mnt).await?;

    let mut current = fh.clone();
    let mut seen: HashSet<nfs_fh3> = HashSet::from([current.clone()]);
    let mut components: Vec<String> = Vec::new();

    loop {
        if let Some(export_dir) = exports.get(&current) {
            let mut path = export_dir.trim_end_matches('/').to_owned();
            for component in &components {
                path.push('/');
                path.push_str(component);
            }
            if path.is_empty() {
                path.push('/');
            }
            return Ok(ResolvedPath {
                path,
                complete: true,
            });
        }

        let args = LOOKUP3args {
            what: diropargs3 {
                dir: current.clone(),
                name: filename3::from(b"..".as_slice()),
            },
        };
        let parent = match cli.lookup(&args).await? {
            Nfs3Result::Ok(ok) => ok.object,
            Nfs3Result::Err((status, _)) => {
                tracing::warn!(%status, "cannot look up ..");
                return Ok(partial(components));
            }
        };
        if !seen.insert(parent.clone()) {
            tracing::warn!(handle = %parent, "parent already visited");
            return Ok(partial(components));
        }

        let (ok, entries) = cli.readdirplus_entire_dir(&parent).await?;
        if !ok {
            tracing::warn!(handle = %parent, "cannot scan parent directory");
            return Ok(partial(components));
        }

        let mut found = false;
        for entry in &entries {
            let Some(entry_fh) = cli.entry_handle(&parent, entry).await? else {
                continue;
            };
            if entry_fh == current {
                components.insert(0, String::from_utf8_lossy(entry.name.as_ref()).into_owned());
                current = parent.clone();
                found = true;
                break;
            }
        }
        if !found {
            tracing::warn!(handle = %current, "child not present in parent listing");
            return Ok(partial(components));
        }
    }
}

fn partial(components: Vec<String>) -> ResolvedPath {
    ResolvedPath {
        path: components.join("/"),
        complete: false,
    }
}

/// Mounts every export to map its root handle to its directory.
async fn export_roots<C: Connector>(
    mnt: &mut MountClient<C>,
) -> Result<HashMap<nfs_fh3, String>, Error> {
    let mut roots = HashMap::new();
    let exports = mnt.export().await?;
    for node in exports.iter() {
        let path = dirpath(nfsops_types::xdr::Opaque::owned(node.ex_dir.as_ref().to_vec()));
        match mnt.mnt(&path).await {
            Ok(ok) => {
                roots.insert(
                    ok.fhandle,
                    String::from_utf8_lossy(node.ex_dir.as_ref()).into_owned(),
                );
            }
            Err(err) => {
                tracing::warn!(
                    export = %String::from_utf8_lossy(node.ex_dir.as_ref()),
                    error = %err,
                    "cannot resolve export root"
                );
            }
        }
    }
    Ok(roots)
}

impl<C: Connector> Nfs3Client<C> {
    /// Drains a directory with READDIR. Returns `(true, entries)` on a
    /// complete listing and `(false, [])` when any page fails.
    pub async fn readdir_entire_dir(
        &mut self,
        dir: &nfs_fh3,
    ) -> Result<(bool, Vec<entry3<'static>>), Error> {
        let mut cookie = 0;
        let mut cookieverf = cookieverf3::default();
        let mut entries = Vec::new();
        loop {
            let args = READDIR3args {
                dir: dir.clone(),
                cookie,
                cookieverf,
                count: DIR_PAGE_BYTES,
            };
            let resok = match self.readdir(&args).await? {
                Nfs3Result::Ok(ok) => ok,
                Nfs3Result::Err((status, _)) => {
                    tracing::error!(%status, "readdir failed");
                    return Ok((false, Vec::new()));
                }
            };
            let page = resok.reply.entries.into_inner();
            if resok.reply.eof {
                entries.extend(page);
                return Ok((true, entries));
            }
            let Some(last) = page.last() else {
                tracing::error!("readdir returned no entries without eof");
                return Ok((false, Vec::new()));
            };
            cookie = last.cookie;
            cookieverf = resok.cookieverf;
            entries.extend(page);
        }
    }

    /// Drains a directory with READDIRPLUS. Returns `(true, entries)` on
    /// a complete listing and `(false, [])` when any page fails.
    pub async fn readdirplus_entire_dir(
        &mut self,
        dir: &nfs_fh3,
    ) -> Result<(bool, Vec<entryplus3<'static>>), Error> {
        let mut cookie = 0;
        let mut cookieverf = cookieverf3::default();
        let mut entries = Vec::new();
        loop {
            let args = READDIRPLUS3args {
                dir: dir.clone(),
                cookie,
                cookieverf,
                dircount: DIR_PAGE_BYTES,
                maxcount: DIR_PAGE_BYTES,
            };
            let resok = match self.readdirplus(&args).await? {
                Nfs3Result::Ok(ok) => ok,
                Nfs3Result::Err((status, _)) => {
                    tracing::error!(%status, "readdirplus failed");
                    return Ok((false, Vec::new()));
                }
            };
            let page = resok.reply.entries.into_inner();
            if resok.reply.eof {
                entries.extend(page);
                return Ok((true, entries));
            }
            let Some(last) = page.last() else {
                tracing::error!("readdirplus returned no entries without eof");
                return Ok((false, Vec::new()));
            };
            cookie = last.cookie;
            cookieverf = resok.cookieverf;
            entries.extend(page);
        }
    }

    /// The handle of a READDIRPLUS entry, via LOOKUP when the server did
    /// not attach one. `Ok(None)` when the lookup fails.
    pub async fn entry_handle(
        &mut self,
        dir: &nfs_fh3,
        entry: &entryplus3<'_>,
    ) -> Result<Option<nfs_fh3>, Error> {
        if let Some(fh) = entry.handle() {
            return Ok(Some(fh.clone()));
        }
        let args = LOOKUP3args {
            what: diropargs3 {
                dir: dir.clone(),
                name: entry.name.clone_to_owned(),
            },
        };
        match self.lookup(&args).await? {
            Nfs3Result::Ok(ok) => Ok(Some(ok.object)),
            Nfs3Result::Err(_) => Ok(None),
        }
    }

    /// Looks up `name` in `parent`; optionally creates it as a directory
    /// when missing, and verifies the handle against `prev_fh` when one
    /// is expected. `Ok(None)` is a reported failure that was already
    /// logged.
    pub async fn lookup_create(
        &mut self,
        tag: &str,
        parent: &nfs_fh3,
        name: &[u8],
        prev_fh: Option<&nfs_fh3>,
        do_create: bool,
    ) -> Result<Option<nfs_fh3>, Error> {
        let name_disp = String::from_utf8_lossy(name).into_owned();
        let lookup_args = LOOKUP3args {
            what: diropargs3 {
                dir: parent.clone(),
                name: filename3::from(name),
            },
        };
        let status = match self.lookup(&lookup_args).await? {
            Nfs3Result::Ok(ok) => {
                if let Some(prev) = prev_fh {
                    if ok.object != *prev {
                        tracing::error!(
                            tag,
                            name = %name_disp,
                            previous = %prev,
                            current = %ok.object,
                            "handle changed"
                        );
                        return Ok(None);
                    }
                }
                return Ok(Some(ok.object));
            }
            Nfs3Result::Err((status, _)) => status,
        };

        if status != nfsstat3::NFS3ERR_NOENT {
            tracing::error!(tag, name = %name_disp, %status, "lookup failed");
            return Ok(None);
        }
        if !do_create {
            tracing::info!(tag, name = %name_disp, "directory does not exist");
            return Ok(None);
        }

        tracing::info!(tag, name = %name_disp, "directory does not exist, creating it");
        let mkdir_args = MKDIR3args {
            where_: diropargs3 {
                dir: parent.clone(),
                name: filename3::from(name),
            },
            attributes: sattr3 {
                mode: nfsops_types::nfs3::set_mode3::Some(0o777),
                uid: nfsops_types::nfs3::set_uid3::Some(0),
                gid: nfsops_types::nfs3::set_gid3::Some(0),
                ..sattr3::default()
            },
        };
        let resok = match self.mkdir(&mkdir_args).await? {
            Nfs3Result::Ok(ok) => ok,
            Nfs3Result::Err((status, _)) => {
                tracing::error!(tag, name = %name_disp, %status, "mkdir failed");
                return Ok(None);
            }
        };
        if let Some(fh) = resok.obj.into_option() {
            return Ok(Some(fh));
        }

        // The server did not return a handle with MKDIR.
        let lookup_args = LOOKUP3args {
            what: diropargs3 {
                dir: parent.clone(),
                name: filename3::from(name),
            },
        };
        match self.lookup(&lookup_args).await? {
            Nfs3Result::Ok(ok) => Ok(Some(ok.object)),
            Nfs3Result::Err((status, _)) => {
                tracing::error!(
                    tag,
                    name = %name_disp,
                    %status,
                    "mkdir returned no handle and the follow-up lookup failed"
                );
                Ok(None)
            }
        }
    }

    /// Removes `name` under `parent_fh` recursively, the logical
    /// equivalent of `rm -r`. Individual failures are logged and turn
    /// the result false without aborting the rest of the walk.
    pub fn remove_subtree<'a>(
        &'a mut self,
        parent_path: &'a str,
        parent_fh: &'a nfs_fh3,
        name: &'a [u8],
    ) -> Pin<Box<dyn Future<Output = Result<bool, Error>> + 'a>> {
        Box::pin(async move {
            let name_disp = String::from_utf8_lossy(name).into_owned();
            let remove_args = REMOVE3args {
                object: diropargs3 {
                    dir: parent_fh.clone(),
                    name: filename3::from(name),
                },
            };
            let status = self.remove(&remove_args).await?.status();
            if status == nfsstat3::NFS3_OK || status == nfsstat3::NFS3ERR_NOENT {
                tracing::debug!(path = %parent_path, name = %name_disp, "removed");
                return Ok(true);
            }
            if status != nfsstat3::NFS3ERR_ISDIR {
                tracing::warn!(path = %parent_path, name = %name_disp, %status, "cannot remove");
                return Ok(false);
            }

            let lookup_args = LOOKUP3args {
                what: diropargs3 {
                    dir: parent_fh.clone(),
                    name: filename3::from(name),
                },
            };
            let child_fh = match self.lookup(&lookup_args).await? {
                Nfs3Result::Ok(ok) => ok.object,
                Nfs3Result::Err((nfsstat3::NFS3ERR_NOENT, _)) => {
                    // Lost a race; if anything is left behind the final
                    // rmdir reports NOTEMPTY.
                    return Ok(true);
                }
                Nfs3Result::Err((status, _)) => {
                    tracing::debug!(path = %parent_path, name = %name_disp, %status, "lookup failed");
                    return Ok(false);
                }
            };

            let mut all_removed = true;
            let child_path = format!("{parent_path}/{name_disp}");
            let (listed, entries) = self.readdirplus_entire_dir(&child_fh).await?;
            if listed {
                for entry in &entries {
                    if SKIPPED_NAMES.contains(&entry.name.as_ref()) {
                        continue;
                    }
                    if !self
                        .remove_subtree(&child_path, &child_fh, entry.name.as_ref())
                        .await?
                    {
                        all_removed = false;
                    }
                }
            } else {
                tracing::warn!(path = %child_path, "could not read directory");
            }

            let rmdir_args = RMDIR3args {
                object: diropargs3 {
                    dir: parent_fh.clone(),
                    name: filename3::from(name),
                },
            };
            let status = self.rmdir(&rmdir_args).await?.status();
            if status == nfsstat3::NFS3_OK {
                tracing::debug!(path = %child_path, "removed");
            } else {
                tracing::warn!(path = %child_path, %status, "cannot rmdir");
                all_removed = false;
            }
            Ok(all_removed)
        })
    }
}
