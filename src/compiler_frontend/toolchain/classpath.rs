//! Classpath entries and the file manager that reads them.
//!
//! Entries hold declaration stubs written in the same language as the sources. They are
//! parsed and indexed on first lookup and the result is cached until `flush`.

use crate::compiler_frontend::compiler_errors::ErrorLocation;
use crate::compiler_frontend::compiler_warnings::{CompilerWarning, WarningKind};
use crate::compiler_frontend::string_interning::StringTable;
use crate::compiler_frontend::toolchain::parser::parse_source;
use crate::compiler_frontend::toolchain::symbols::DeclRef;
use crate::compiler_frontend::toolchain::syntax::CompilationUnit;
use crate::projects::settings::SOURCE_FILE_EXTENSION;
use crate::symbol_log;
use rustc_hash::{FxHashMap, FxHashSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ClasspathEntry {
    /// A stub file or a directory searched recursively for stub files
    Path(PathBuf),
    /// Synthetic or injected definitions
    InMemory { name: String, bytes: Vec<u8> },
}

impl ClasspathEntry {
    pub fn in_memory(name: impl Into<String>, source: &str) -> Self {
        ClasspathEntry::InMemory {
            name: name.into(),
            bytes: source.as_bytes().to_vec(),
        }
    }
}

struct LoadedClasspath {
    index: FxHashMap<String, DeclRef>,

    /// Every package and parent package that holds a classpath class
    packages: FxHashSet<String>,
}

pub struct FileManager {
    entries: Vec<ClasspathEntry>,
    loaded: Option<LoadedClasspath>,
    warnings: Vec<CompilerWarning>,
}

impl FileManager {
    pub fn new(entries: Vec<ClasspathEntry>) -> Self {
        FileManager {
            entries,
            loaded: None,
            warnings: Vec::new(),
        }
    }

    pub fn entries(&self) -> &[ClasspathEntry] {
        &self.entries
    }

    pub fn set_entries(&mut self, entries: Vec<ClasspathEntry>) {
        self.entries = entries;
        self.flush();
    }

    /// Drop everything read so far. Entries are read again on the next lookup.
    pub fn flush(&mut self) {
        self.loaded = None;
        self.warnings.clear();
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded.is_some()
    }

    pub fn take_warnings(&mut self) -> Vec<CompilerWarning> {
        std::mem::take(&mut self.warnings)
    }

    pub fn find_class(&mut self, flat_name: &str, names: &mut StringTable) -> Option<DeclRef> {
        if self.loaded.is_none() {
            let loaded = self.load(names);
            self.loaded = Some(loaded);
        }

        self.loaded
            .as_ref()
            .and_then(|loaded| loaded.index.get(flat_name).cloned())
    }

    pub fn has_package(&mut self, full_name: &str, names: &mut StringTable) -> bool {
        if self.loaded.is_none() {
            let loaded = self.load(names);
            self.loaded = Some(loaded);
        }

        self.loaded
            .as_ref()
            .is_some_and(|loaded| loaded.packages.contains(full_name))
    }

    fn load(&mut self, names: &mut StringTable) -> LoadedClasspath {
        let mut loaded = LoadedClasspath {
            index: FxHashMap::default(),
            packages: FxHashSet::default(),
        };

        for (path, source) in PLATFORM_STUBS {
            self.index_source(Path::new(path), source, names, &mut loaded);
        }

        let entries = self.entries.clone();
        for entry in &entries {
            match entry {
                ClasspathEntry::Path(path) => {
                    let mut files = Vec::new();
                    if let Err(msg) = collect_stub_files(path, &mut files) {
                        self.warnings.push(CompilerWarning::new(
                            msg,
                            ErrorLocation::for_file(path),
                            WarningKind::MissingClasspathEntry,
                        ));
                        continue;
                    }

                    for file in files {
                        match fs::read_to_string(&file) {
                            Ok(source) => self.index_source(&file, &source, names, &mut loaded),
                            Err(e) => self.warnings.push(CompilerWarning::new(
                                e.to_string(),
                                ErrorLocation::for_file(&file),
                                WarningKind::MissingClasspathEntry,
                            )),
                        }
                    }
                }

                ClasspathEntry::InMemory { name, bytes } => {
                    let path = PathBuf::from(name);
                    match std::str::from_utf8(bytes) {
                        Ok(source) => self.index_source(&path, source, names, &mut loaded),
                        Err(e) => self.warnings.push(CompilerWarning::new(
                            format!("In-memory classpath entry is not valid UTF-8: {e}"),
                            ErrorLocation::for_file(&path),
                            WarningKind::MissingClasspathEntry,
                        )),
                    }
                }
            }
        }

        symbol_log!("Indexed ", {loaded.index.len()}, " classpath classes");
        loaded
    }

    fn index_source(
        &mut self,
        path: &Path,
        source: &str,
        names: &mut StringTable,
        loaded: &mut LoadedClasspath,
    ) {
        let unit = match parse_source(source, path, names) {
            Ok(unit) => Rc::new(unit),
            Err(e) => {
                self.warnings.push(CompilerWarning::new(
                    format!("Classpath entry could not be parsed: {}", e.msg),
                    e.location,
                    WarningKind::MissingClasspathEntry,
                ));
                return;
            }
        };

        let package = unit.package_name(names);
        let mut prefix = package.as_str();
        while !prefix.is_empty() {
            loaded.packages.insert(prefix.to_owned());
            prefix = prefix.rfind('.').map_or("", |split| &prefix[..split]);
        }

        for (class_path, _) in unit.class_paths() {
            let flat_name = flat_name_of(&unit, &class_path, names);
            if loaded.index.contains_key(&flat_name) {
                self.warnings.push(CompilerWarning::new(
                    flat_name,
                    ErrorLocation::for_file(path),
                    WarningKind::DuplicateClass,
                ));
                continue;
            }

            loaded.index.insert(
                flat_name,
                DeclRef {
                    unit: Rc::clone(&unit),
                    path: class_path,
                },
            );
        }
    }
}

/// `package.Outer$Inner` for the class at `path` inside `unit`
pub fn flat_name_of(unit: &CompilationUnit, path: &[usize], names: &StringTable) -> String {
    let mut flat_name = unit.package_name(names);

    for depth in 1..=path.len() {
        let Some(class) = unit.class_at(&path[..depth]) else {
            break;
        };

        if depth == 1 {
            if !flat_name.is_empty() {
                flat_name.push('.');
            }
        } else {
            flat_name.push('$');
        }
        flat_name.push_str(names.resolve(class.name));
    }

    flat_name
}

fn collect_stub_files(path: &Path, files: &mut Vec<PathBuf>) -> Result<(), String> {
    if path.is_file() {
        files.push(path.to_path_buf());
        return Ok(());
    }

    if !path.is_dir() {
        return Err(format!("Classpath entry does not exist: {}", path.display()));
    }

    let mut children = match fs::read_dir(path) {
        Ok(read_dir) => read_dir
            .filter_map(|entry| entry.ok().map(|entry| entry.path()))
            .collect::<Vec<_>>(),
        Err(e) => return Err(e.to_string()),
    };

    // Deterministic order so duplicate resolution doesn't depend on the filesystem
    children.sort();

    for child in children {
        if child.is_dir() {
            collect_stub_files(&child, files)?;
        } else if child
            .extension()
            .is_some_and(|extension| extension == SOURCE_FILE_EXTENSION)
        {
            files.push(child);
        }
    }

    Ok(())
}

/// The built-in platform library. Always on the classpath, before any user entry.
const PLATFORM_STUBS: &[(&str, &str)] = &[
    (
        "<platform>/java/lang/package.java",
        r#"
package java.lang;

public class Object {
    public Object();
    public boolean equals(Object other);
    public int hashCode();
    public String toString();
    public final Class<?> getClass();
}

public final class Class<T> {
    public String getName();
}

public interface CharSequence {
    int length();
    char charAt(int index);
}

public interface Comparable<T> {
    int compareTo(T other);
}

public interface Iterable<T> {
    java.util.Iterator<T> iterator();
}

public final class String implements java.io.Serializable, Comparable<String>, CharSequence {
    private static final java.io.ObjectStreamField[] serialPersistentFields;
    public String();
    public String(String original);
    public int length();
    public char charAt(int index);
    public boolean isEmpty();
    public String substring(int begin, int end);
    public String concat(String other);
    public int compareTo(String other);
    public static String valueOf(Object value);
}

public abstract class Number implements java.io.Serializable {
    public Number();
    public abstract int intValue();
    public abstract long longValue();
    public abstract double doubleValue();
}

public final class Integer extends Number implements Comparable<Integer> {
    public static final int MAX_VALUE;
    public static Integer valueOf(int value);
    public int intValue();
    public long longValue();
    public double doubleValue();
    public int compareTo(Integer other);
}

public final class Boolean implements java.io.Serializable, Comparable<Boolean> {
    public static Boolean valueOf(boolean value);
    public boolean booleanValue();
    public int compareTo(Boolean other);
}

public abstract class Enum<E extends Enum<E>> implements Comparable<E>, java.io.Serializable {
    protected Enum(String name, int ordinal);
    public final String name();
    public final int ordinal();
    public final int compareTo(E other);
}

public abstract class Record {
    protected Record();
}

public class Throwable implements java.io.Serializable {
    public Throwable();
    public Throwable(String message);
    public String getMessage();
}

public class Exception extends Throwable {
    public Exception();
    public Exception(String message);
}

public class RuntimeException extends Exception {
    public RuntimeException();
    public RuntimeException(String message);
}

public final class Math {
    public static int max(int a, int b);
    public static int abs(int value);
}

public final class System {
    public static final java.io.PrintStream out;
}

public @interface Override {}

public @interface Deprecated {
    String since() default "";
    boolean forRemoval() default false;
}

public @interface FunctionalInterface {}

public @interface SuppressWarnings {
    String[] value();
}
"#,
    ),
    (
        "<platform>/java/lang/annotation/package.java",
        r#"
package java.lang.annotation;

public interface Annotation {
    Class<?> annotationType();
}

public enum ElementType {
    TYPE, FIELD, METHOD, PARAMETER, CONSTRUCTOR, LOCAL_VARIABLE, ANNOTATION_TYPE, TYPE_PARAMETER, TYPE_USE
}

public enum RetentionPolicy {
    SOURCE, CLASS, RUNTIME
}

public @interface Target {
    ElementType[] value();
}

public @interface Retention {
    RetentionPolicy value();
}

public @interface Documented {}
"#,
    ),
    (
        "<platform>/java/io/package.java",
        r#"
package java.io;

public interface Serializable {}

public class ObjectStreamField {
    public ObjectStreamField(String name, Class<?> type);
    public String getName();
}

public class PrintStream {
    public void println(String value);
    public void println(Object value);
    public void println(int value);
}

public class IOException extends Exception {
    public IOException();
    public IOException(String message);
}
"#,
    ),
    (
        "<platform>/java/util/package.java",
        r#"
package java.util;

public interface Iterator<E> {
    boolean hasNext();
    E next();
}

public interface Collection<E> extends Iterable<E> {
    int size();
    boolean isEmpty();
    boolean add(E element);
}

public interface List<E> extends Collection<E> {
    E get(int index);
    E set(int index, E element);
    static <E> List<E> of();
}

public class ArrayList<E> implements List<E> {
    public ArrayList();
    public E get(int index);
    public E set(int index, E element);
    public int size();
    public boolean isEmpty();
    public boolean add(E element);
    public Iterator<E> iterator();
}

public interface Map<K, V> {
    V get(Object key);
    V put(K key, V value);
    int size();
}

public class HashMap<K, V> implements Map<K, V> {
    public HashMap();
    public V get(Object key);
    public V put(K key, V value);
    public int size();
}

public final class Optional<T> {
    public static <T> Optional<T> of(T value);
    public static <T> Optional<T> empty();
    public T get();
    public boolean isPresent();
}
"#,
    ),
];

#[cfg(test)]
#[path = "tests/classpath_tests.rs"]
mod tests;
