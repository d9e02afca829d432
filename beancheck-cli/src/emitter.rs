//! Source emitters turning assembled suites into test code.
//!
//! The core hands over [`TestSuite`]s made of abstract statements; an
//! emitter decides concrete syntax only. [`JunitEmitter`] renders JUnit 4
//! classes in the package of the target type.

use beancheck::{
    Assertion, CollectionKind, Expr, Literal, Procedure, ProcedureRole, QualifiedName, Statement,
    TemporalKind, TemporalValue, TestSuite, TypeRef,
};
use std::collections::BTreeSet;
use std::path::PathBuf;

/// Trait for test source emitters.
///
/// Implement this trait to target another test framework or language.
pub trait SourceEmitter: Send + Sync {
    /// Short identifier (e.g. "junit4").
    fn id(&self) -> &'static str;

    /// Extension of generated files, without the dot.
    fn file_extension(&self) -> &'static str;

    /// Render one suite into a complete source file.
    fn render(&self, suite: &TestSuite) -> String;

    /// Path of the suite's file relative to the output root: one directory
    /// per package segment, then the class name.
    fn relative_path(&self, suite: &TestSuite) -> PathBuf {
        let mut path = PathBuf::new();
        for segment in suite.name.package.split('.').filter(|s| !s.is_empty()) {
            path.push(segment);
        }
        path.push(format!("{}.{}", suite.name.class, self.file_extension()));
        path
    }
}

/// Header line of every generated file.
pub const GENERATED_HEADER: &str = "// Generated by beancheck. Do not edit.";

const INDENT: &str = "    ";

/// JUnit 4 emitter.
#[derive(Debug, Clone, Default)]
pub struct JunitEmitter;

impl JunitEmitter {
    /// Create a new JUnit emitter.
    pub fn new() -> Self {
        Self
    }
}

impl SourceEmitter for JunitEmitter {
    fn id(&self) -> &'static str {
        "junit4"
    }

    fn file_extension(&self) -> &'static str {
        "java"
    }

    fn render(&self, suite: &TestSuite) -> String {
        let mut class = JavaClass::new(&suite.name.package);

        let methods: Vec<String> = suite
            .procedures()
            .map(|procedure| class.method(procedure))
            .collect();

        let mut out = String::new();
        out.push_str(GENERATED_HEADER);
        out.push('\n');
        if !suite.name.package.is_empty() {
            out.push_str(&format!("package {};\n", suite.name.package));
        }
        out.push('\n');

        if !class.imports.is_empty() {
            for import in &class.imports {
                out.push_str(&format!("import {};\n", import));
            }
            out.push('\n');
        }

        out.push_str(&format!("public class {} {{\n", suite.name.class));
        for method in &methods {
            out.push('\n');
            out.push_str(method);
        }
        out.push_str("}\n");
        out
    }
}

/// Rendering state of one class; records the imports its statements need.
struct JavaClass<'a> {
    package: &'a str,
    imports: BTreeSet<&'static str>,
}

impl<'a> JavaClass<'a> {
    fn new(package: &'a str) -> Self {
        Self {
            package,
            imports: BTreeSet::new(),
        }
    }

    fn method(&mut self, procedure: &Procedure) -> String {
        let signature = match &procedure.role {
            ProcedureRole::Test => {
                self.imports.insert("org.junit.Test");
                format!("{INDENT}@Test\n{INDENT}public void {}() {{\n", procedure.name)
            }
            ProcedureRole::Helper { returns } => format!(
                "{INDENT}private static {} {}() {{\n",
                self.type_name(returns),
                procedure.name
            ),
        };

        let mut out = signature;
        for stmt in &procedure.body {
            out.push_str(INDENT);
            out.push_str(INDENT);
            out.push_str(&self.statement(stmt));
            out.push('\n');
        }
        out.push_str(INDENT);
        out.push_str("}\n");
        out
    }

    fn statement(&mut self, stmt: &Statement) -> String {
        match stmt {
            Statement::Declare { ty, name } => format!("{} {};", self.type_name(ty), name),
            Statement::Assign { name, value } => format!("{} = {};", name, self.expr(value)),
            Statement::Set {
                target,
                setter,
                value,
            } => format!("{}.{}({});", target, setter, self.expr(value)),
            Statement::Assert(assertion) => {
                self.imports.insert("org.junit.Assert");
                match assertion {
                    Assertion::Equal(a, b) => {
                        format!("Assert.assertEquals({}, {});", self.expr(a), self.expr(b))
                    }
                    Assertion::NotEqual(a, b) => {
                        format!("Assert.assertNotEquals({}, {});", self.expr(a), self.expr(b))
                    }
                    Assertion::NotAbsent(e) => format!("Assert.assertNotNull({});", self.expr(e)),
                }
            }
            Statement::Return(value) => format!("return {};", self.expr(value)),
        }
    }

    fn expr(&mut self, expr: &Expr) -> String {
        match expr {
            Expr::Literal(Literal::Str(text)) => format!("\"{}\"", escape_string(text)),
            Expr::Literal(Literal::Int32(n)) => n.to_string(),
            Expr::Literal(Literal::Int64(n)) => format!("{}L", n),
            Expr::Absent => "null".to_string(),
            Expr::Var(name) => name.clone(),
            Expr::Call(name) => format!("{}()", name),
            Expr::New { ty, args } => {
                let ty = self.type_name(ty);
                let args: Vec<String> = args.iter().map(|arg| self.expr(arg)).collect();
                format!("new {}({})", ty, args.join(", "))
            }
            Expr::Text(inner) => format!("{}.toString()", self.expr(inner)),
            Expr::Hash(inner) => format!("{}.hashCode()", self.expr(inner)),
            Expr::Temporal(value) => self.temporal(value),
            Expr::EmptyCollection(kind) => {
                self.imports.insert("java.util.Collections");
                let factory = match kind {
                    CollectionKind::List => "emptyList",
                    CollectionKind::Set => "emptySet",
                    CollectionKind::Map => "emptyMap",
                };
                format!("Collections.{}()", factory)
            }
        }
    }

    fn temporal(&mut self, value: &TemporalValue) -> String {
        match *value {
            TemporalValue::Instant { epoch_millis } => {
                self.imports.insert("java.util.Date");
                format!("new Date({}L)", epoch_millis)
            }
            TemporalValue::CalendarDate { epoch_day } => {
                self.imports.insert("java.time.LocalDate");
                format!("LocalDate.ofEpochDay({}L)", epoch_day)
            }
            TemporalValue::WallClockTime { second_of_day } => {
                self.imports.insert("java.time.LocalTime");
                format!("LocalTime.ofSecondOfDay({}L)", second_of_day)
            }
            TemporalValue::DateTime {
                epoch_day,
                second_of_day,
            } => {
                self.imports.insert("java.time.LocalDateTime");
                let date = self.temporal(&TemporalValue::CalendarDate { epoch_day });
                let time = self.temporal(&TemporalValue::WallClockTime { second_of_day });
                format!("LocalDateTime.of({}, {})", date, time)
            }
        }
    }

    fn type_name(&mut self, ty: &TypeRef) -> String {
        match ty {
            TypeRef::Target(name) => self.target_name(name),
            TypeRef::Temporal(kind) => {
                let (import, simple) = match kind {
                    TemporalKind::Instant => ("java.util.Date", "Date"),
                    TemporalKind::CalendarDate => ("java.time.LocalDate", "LocalDate"),
                    TemporalKind::WallClockTime => ("java.time.LocalTime", "LocalTime"),
                    TemporalKind::DateTime => ("java.time.LocalDateTime", "LocalDateTime"),
                };
                self.imports.insert(import);
                simple.to_string()
            }
            TypeRef::Collection(kind) => {
                let (import, simple) = match kind {
                    CollectionKind::List => ("java.util.List", "List"),
                    CollectionKind::Set => ("java.util.Set", "Set"),
                    CollectionKind::Map => ("java.util.Map", "Map"),
                };
                self.imports.insert(import);
                simple.to_string()
            }
        }
    }

    /// Targets in the suite's own package need no qualification; others are
    /// written fully qualified instead of imported, so equal simple names
    /// from different packages cannot clash.
    fn target_name(&self, name: &QualifiedName) -> String {
        if name.package == self.package {
            name.name.clone()
        } else {
            name.to_string()
        }
    }
}

/// Escape a string for use in a Java string literal.
fn escape_string(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
        .replace('\r', "\\r")
        .replace('\t', "\\t")
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use beancheck::SuiteName;

    fn suite(package: &str, tests: Vec<Procedure>, helpers: Vec<Procedure>) -> TestSuite {
        TestSuite {
            name: SuiteName {
                package: package.to_string(),
                class: "ThingStructureTest".to_string(),
            },
            target: QualifiedName::new(package, "Thing"),
            tests,
            helpers,
        }
    }

    fn render_expr(expr: &Expr) -> String {
        JavaClass::new("p").expr(expr)
    }

    #[test]
    fn test_relative_path() {
        let emitter = JunitEmitter::new();
        let nested = suite("com.example.model", Vec::new(), Vec::new());
        assert_eq!(
            emitter.relative_path(&nested),
            PathBuf::from("com/example/model/ThingStructureTest.java")
        );

        let root = suite("", Vec::new(), Vec::new());
        assert_eq!(emitter.relative_path(&root), PathBuf::from("ThingStructureTest.java"));
    }

    #[test]
    fn test_literals() {
        assert_eq!(
            render_expr(&Expr::Literal(Literal::Str("say \"hi\"\n".into()))),
            r#""say \"hi\"\n""#
        );
        assert_eq!(render_expr(&Expr::Literal(Literal::Int32(-7))), "-7");
        assert_eq!(render_expr(&Expr::Literal(Literal::Int64(2))), "2L");
        assert_eq!(render_expr(&Expr::Absent), "null");
        assert_eq!(render_expr(&Expr::Call("createList".into())), "createList()");
        assert_eq!(render_expr(&Expr::hash_of("obj1")), "obj1.hashCode()");
    }

    #[test]
    fn test_temporal_values_collect_imports() {
        let mut class = JavaClass::new("p");
        let rendered = class.expr(&Expr::Temporal(TemporalValue::DateTime {
            epoch_day: 17119,
            second_of_day: 2000,
        }));

        assert_eq!(
            rendered,
            "LocalDateTime.of(LocalDate.ofEpochDay(17119L), LocalTime.ofSecondOfDay(2000L))"
        );
        let imports: Vec<_> = class.imports.iter().copied().collect();
        assert_eq!(
            imports,
            vec!["java.time.LocalDate", "java.time.LocalDateTime", "java.time.LocalTime"]
        );
    }

    #[test]
    fn test_target_names() {
        let mut class = JavaClass::new("sample");
        let nested = TypeRef::Target(QualifiedName::new("sample", "MyEnclosing.MyEnclosed"));
        let foreign = TypeRef::Target(QualifiedName::new("other", "Thing"));

        assert_eq!(class.type_name(&nested), "MyEnclosing.MyEnclosed");
        assert_eq!(class.type_name(&foreign), "other.Thing");
        assert!(class.imports.is_empty());
    }

    #[test]
    fn test_render_suite() {
        let target = TypeRef::Target(QualifiedName::new("p", "Thing"));
        let test = Procedure::test(
            "testToString",
            vec![
                Statement::Declare {
                    ty: target.clone(),
                    name: "obj".into(),
                },
                Statement::Assign {
                    name: "obj".into(),
                    value: Expr::New {
                        ty: target.clone(),
                        args: Vec::new(),
                    },
                },
                Statement::Set {
                    target: "obj".into(),
                    setter: "setItems".into(),
                    value: Expr::Call("createList".into()),
                },
                Statement::Assert(Assertion::NotAbsent(Expr::text_of("obj"))),
            ],
        );
        let helper = Procedure::helper(
            "createList",
            TypeRef::Collection(CollectionKind::List),
            vec![Statement::Return(Expr::EmptyCollection(CollectionKind::List))],
        );

        let source = JunitEmitter::new().render(&suite("p", vec![test], vec![helper]));

        let expected = "\
// Generated by beancheck. Do not edit.
package p;

import java.util.Collections;
import java.util.List;
import org.junit.Assert;
import org.junit.Test;

public class ThingStructureTest {

    @Test
    public void testToString() {
        Thing obj;
        obj = new Thing();
        obj.setItems(createList());
        Assert.assertNotNull(obj.toString());
    }

    private static List createList() {
        return Collections.emptyList();
    }
}
";
        assert_eq!(source, expected);
    }

    #[test]
    fn test_render_empty_suite_in_default_package() {
        let source = JunitEmitter::new().render(&suite("", Vec::new(), Vec::new()));
        assert_eq!(
            source,
            "// Generated by beancheck. Do not edit.\n\npublic class ThingStructureTest {\n}\n"
        );
    }
}
