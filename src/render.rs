//! Rendering of the generation payload into one C++ translation unit
//!
//! The builder assembles the file from the fragments the emitter produced:
//! per-sketch type-registration helpers, the aggregate scaffolding that
//! creates and merges sketches (bind data, state, operation structs,
//! factories), one specialized function definition per (sketch, operation,
//! element type), and per-sketch loader functions that register every
//! `ScalarFunctionSet` and `AggregateFunctionSet` with the system catalog.
//! The payload arrives fully built, so rendering itself cannot fail and is
//! a pure string assembly.

use crate::catalog::{LogicalType, SketchCategory, SketchType};
use crate::config::GeneratorConfig;
use crate::emitter::indent;
use crate::payload::{FunctionPayload, GenerationPayload, SketchPayload};

/// Build the generated source file incrementally
pub struct SourceBuilder {
    config: GeneratorConfig,
    aggregates: Vec<String>,
    type_helpers: Vec<String>,
    functions: Vec<String>,
    loaders: Vec<String>,
    loader_names: Vec<String>,
}

/// C++ symbol for one specialized function definition
fn function_symbol(sketch: SketchType, operation: &str, elem: LogicalType) -> String {
    format!("DS{}_{}_{}", sketch.cpp_name(), operation, elem.suffix())
}

/// Aggregate state lifecycle shared by every operation struct
const OPERATION_BASE: &str = "\
struct DSSketchOperationBase
{
    template <class STATE>
    static void Initialize(STATE &state)
    {
        state.sketch = nullptr;
    }

    template <class STATE>
    static void Destroy(STATE &state, AggregateInputData &aggr_input_data)
    {
        if (state.sketch)
        {
            delete state.sketch;
            state.sketch = nullptr;
        }
    }

    static bool IgnoreNull() { return true; }
};";

/// Create/merge operations shared by every non-counting algorithm; the
/// underlying structures expose a direct `merge`, so no union object is
/// involved.
const GENERIC_OPERATIONS: &str = "\
template <class BIND_DATA_TYPE>
struct DSSketchCreateOperation : DSSketchOperationBase
{
    template <class A_TYPE, class STATE, class OP>
    static void Operation(STATE &state, const A_TYPE &a_data, AggregateUnaryInput &idata)
    {
        if (!state.sketch)
        {
            auto &bind_data = idata.input.bind_data->template Cast<BIND_DATA_TYPE>();
            state.CreateSketch(bind_data.k);
        }

        state.sketch->update(a_data);
    }

    template <class INPUT_TYPE, class STATE, class OP>
    static void ConstantOperation(STATE &state, const INPUT_TYPE &input, AggregateUnaryInput &unary_input,
                                  idx_t count)
    {
        for (idx_t i = 0; i < count; i++)
        {
            Operation<INPUT_TYPE, STATE, OP>(state, input, unary_input);
        }
    }

    template <class STATE, class OP>
    static void Combine(const STATE &source, STATE &target, AggregateInputData &aggr_input_data)
    {
        if (!target.sketch)
        {
            target.CreateSketch(source);
        }
        else
        {
            target.sketch->merge(*source.sketch);
        }
    }

    template <class T, class STATE>
    static void Finalize(STATE &state, T &target, AggregateFinalizeData &finalize_data)
    {
        if (!state.sketch)
        {
            finalize_data.ReturnNull();
        }
        else
        {
            auto serialized_data = state.sketch->serialize();
            auto sketch_string = std::string(serialized_data.begin(), serialized_data.end());
            target = StringVector::AddStringOrBlob(finalize_data.result, sketch_string);
        }
    }
};

template <class BIND_DATA_TYPE>
struct DSSketchMergeOperation : DSSketchOperationBase
{
    template <class A_TYPE, class STATE, class OP>
    static void Operation(STATE &state, const A_TYPE &a_data, AggregateUnaryInput &idata)
    {
        if (!state.sketch)
        {
            auto &bind_data = idata.input.bind_data->template Cast<BIND_DATA_TYPE>();
            state.CreateSketch(bind_data.k);
        }

        // The incoming value is itself a serialized sketch.
        state.sketch->merge(state.deserialize_sketch(a_data));
    }

    template <class INPUT_TYPE, class STATE, class OP>
    static void ConstantOperation(STATE &state, const INPUT_TYPE &input, AggregateUnaryInput &unary_input,
                                  idx_t count)
    {
        for (idx_t i = 0; i < count; i++)
        {
            Operation<INPUT_TYPE, STATE, OP>(state, input, unary_input);
        }
    }

    template <class STATE, class OP>
    static void Combine(const STATE &source, STATE &target, AggregateInputData &aggr_input_data)
    {
        if (!target.sketch)
        {
            target.CreateSketch(source);
        }
        else
        {
            target.sketch->merge(*source.sketch);
        }
    }

    template <class T, class STATE>
    static void Finalize(STATE &state, T &target, AggregateFinalizeData &finalize_data)
    {
        if (!state.sketch)
        {
            finalize_data.ReturnNull();
        }
        else
        {
            auto serialized_data = state.sketch->serialize();
            auto sketch_string = std::string(serialized_data.begin(), serialized_data.end());
            target = StringVector::AddStringOrBlob(finalize_data.result, sketch_string);
        }
    }
};";

const BIND_DATA_TEMPLATE: &str = "\
struct DS{cpp}BindData : public FunctionData
{
    DS{cpp}BindData()
    {
    }
    explicit DS{cpp}BindData(int32_t k) : k(k)
    {
    }

    unique_ptr<FunctionData> Copy() const override
    {
        return make_uniq<DS{cpp}BindData>(k);
    }

    bool Equals(const FunctionData &other_p) const override
    {
        auto &other = other_p.Cast<DS{cpp}BindData>();
        return k == other.k;
    }

    int32_t k;
};

static unique_ptr<FunctionData> DS{cpp}Bind(ClientContext &context, AggregateFunction &function,
                                            vector<unique_ptr<Expression>> &arguments)
{
    if (arguments[0]->HasParameter())
    {
        throw ParameterNotResolvedException();
    }
    if (!arguments[0]->IsFoldable())
    {
        throw BinderException(\"{cpp} can only take a constant K value\");
    }
    Value k_val = ExpressionExecutor::EvaluateScalar(context, *arguments[0]);
    if (k_val.IsNull())
    {
        throw BinderException(\"{cpp} K value cannot be NULL\");
    }

    auto actual_k = k_val.GetValue<int32_t>();

    Function::EraseArgument(function, arguments, 0);
    return make_uniq<DS{cpp}BindData>(actual_k);
}";

/// State for the non-counting algorithms; the element type stays generic
/// until the factory instantiates it.
const TYPED_STATE_TEMPLATE: &str = "\
template <class T>
struct DS{cpp}State
{
    {struct}<T> *sketch = nullptr;

    ~DS{cpp}State()
    {
        if (sketch)
        {
            delete sketch;
        }
    }

    void CreateSketch({k} k)
    {
        D_ASSERT(!sketch);
        sketch = new {struct}<T>(k);
    }

    void CreateSketch(const DS{cpp}State &existing)
    {
        if (existing.sketch)
        {
            sketch = new {struct}<T>(*existing.sketch);
        }
    }

    {struct}<T> deserialize_sketch(const string_t &data)
    {
        return {struct}<T>::deserialize(data.GetDataUnsafe(), data.GetSize());
    }
};";

/// State for the counting algorithms; the underlying structure is concrete.
const COUNTING_STATE_TEMPLATE: &str = "\
struct DS{cpp}State
{
    {struct} *sketch = nullptr;

    ~DS{cpp}State()
    {
        if (sketch)
        {
            delete sketch;
        }
    }

    void CreateSketch({k} k)
    {
        D_ASSERT(!sketch);
        sketch = new {struct}(k);
    }

    void CreateSketch(const DS{cpp}State &existing)
    {
        if (existing.sketch)
        {
            sketch = new {struct}(*existing.sketch);
        }
    }

    {struct} deserialize_sketch(const string_t &data)
    {
        return {struct}::deserialize(data.GetDataUnsafe(), data.GetSize());
    }
};";

/// Counting algorithms update from raw values (string inputs go through the
/// byte-range overload) and combine through a union object.
const COUNTING_OPERATIONS_TEMPLATE: &str = "\
template <class BIND_DATA_TYPE>
struct DS{cpp}CreateOperation : DSSketchOperationBase
{
    template <class A_TYPE, class STATE, class OP>
    static void Operation(STATE &state, const A_TYPE &a_data, AggregateUnaryInput &idata)
    {
        if (!state.sketch)
        {
            auto &bind_data = idata.input.bind_data->template Cast<BIND_DATA_TYPE>();
            state.CreateSketch(bind_data.k);
        }

        if constexpr (std::is_same_v<A_TYPE, duckdb::string_t>)
        {
            state.sketch->update(a_data.GetData(), a_data.GetSize());
        }
        else
        {
            state.sketch->update(a_data);
        }
    }

    template <class INPUT_TYPE, class STATE, class OP>
    static void ConstantOperation(STATE &state, const INPUT_TYPE &input, AggregateUnaryInput &unary_input,
                                  idx_t count)
    {
        for (idx_t i = 0; i < count; i++)
        {
            Operation<INPUT_TYPE, STATE, OP>(state, input, unary_input);
        }
    }

    template <class STATE, class OP>
    static void Combine(const STATE &source, STATE &target, AggregateInputData &aggr_input_data)
    {
        if (!target.sketch)
        {
            target.CreateSketch(source);
        }
        else
        {
            {union} u(target.sketch->{lg});
            u.update(*target.sketch);
            if (source.sketch)
            {
                u.update(*source.sketch);
            }
            *target.sketch = {result};
        }
    }

    template <class T, class STATE>
    static void Finalize(STATE &state, T &target, AggregateFinalizeData &finalize_data)
    {
        if (!state.sketch)
        {
            finalize_data.ReturnNull();
        }
        else
        {
            auto serialized_data = state.sketch->{serialize};
            auto sketch_string = std::string(serialized_data.begin(), serialized_data.end());
            target = StringVector::AddStringOrBlob(finalize_data.result, sketch_string);
        }
    }
};

template <class BIND_DATA_TYPE>
struct DS{cpp}MergeOperation : DSSketchOperationBase
{
    template <class A_TYPE, class STATE, class OP>
    static void Operation(STATE &state, const A_TYPE &a_data, AggregateUnaryInput &idata)
    {
        auto &bind_data = idata.input.bind_data->template Cast<BIND_DATA_TYPE>();
        if (!state.sketch)
        {
            state.CreateSketch(bind_data.k);
        }

        {union} u(bind_data.k);
        u.update(*state.sketch);
        u.update(state.deserialize_sketch(a_data));
        *state.sketch = {result};
    }

    template <class INPUT_TYPE, class STATE, class OP>
    static void ConstantOperation(STATE &state, const INPUT_TYPE &input, AggregateUnaryInput &unary_input,
                                  idx_t count)
    {
        for (idx_t i = 0; i < count; i++)
        {
            Operation<INPUT_TYPE, STATE, OP>(state, input, unary_input);
        }
    }

    template <class STATE, class OP>
    static void Combine(const STATE &source, STATE &target, AggregateInputData &aggr_input_data)
    {
        if (!target.sketch)
        {
            target.CreateSketch(source);
        }
        else
        {
            {union} u(target.sketch->{lg});
            u.update(*target.sketch);
            if (source.sketch)
            {
                u.update(*source.sketch);
            }
            *target.sketch = {result};
        }
    }

    template <class T, class STATE>
    static void Finalize(STATE &state, T &target, AggregateFinalizeData &finalize_data)
    {
        if (!state.sketch)
        {
            finalize_data.ReturnNull();
        }
        else
        {
            auto serialized_data = state.sketch->{serialize};
            auto sketch_string = std::string(serialized_data.begin(), serialized_data.end());
            target = StringVector::AddStringOrBlob(finalize_data.result, sketch_string);
        }
    }
};";

const TYPED_FACTORIES_TEMPLATE: &str = "\
template <typename T>
auto static DS{cpp}CreateAggregate(const LogicalType &type, const LogicalType &result_type) -> AggregateFunction
{
    return AggregateFunction::UnaryAggregateDestructor<DS{cpp}State<T>, T, string_t, DSSketchCreateOperation<DS{cpp}BindData>, AggregateDestructorType::LEGACY>(
        type, result_type);
}

template <typename T>
auto static DS{cpp}MergeAggregate(const LogicalType &type, const LogicalType &result_type) -> AggregateFunction
{
    return AggregateFunction::UnaryAggregateDestructor<DS{cpp}State<T>, string_t, string_t, DSSketchMergeOperation<DS{cpp}BindData>, AggregateDestructorType::LEGACY>(
        result_type, result_type);
}";

/// A counting sketch has one concrete handle type, so merging needs no type
/// parameter at all.
const COUNTING_FACTORIES_TEMPLATE: &str = "\
template <typename T>
auto static DS{cpp}CreateAggregate(const LogicalType &type, const LogicalType &result_type) -> AggregateFunction
{
    return AggregateFunction::UnaryAggregateDestructor<DS{cpp}State, T, string_t, DS{cpp}CreateOperation<DS{cpp}BindData>, AggregateDestructorType::LEGACY>(
        type, result_type);
}

auto static DS{cpp}MergeAggregate(const LogicalType &result_type) -> AggregateFunction
{
    return AggregateFunction::UnaryAggregateDestructor<DS{cpp}State, string_t, string_t, DS{cpp}MergeOperation<DS{cpp}BindData>, AggregateDestructorType::LEGACY>(
        result_type, result_type);
}";

/// (union type, log-K getter, union result expression, finalize serializer)
fn counting_union(sketch: SketchType) -> (&'static str, &'static str, &'static str, &'static str) {
    match sketch {
        SketchType::Hll => (
            "datasketches::hll_union",
            "get_lg_config_k()",
            "u.get_result(datasketches::target_hll_type::HLL_4)",
            "serialize_updatable()",
        ),
        _ => (
            "datasketches::cpc_union",
            "get_lg_k()",
            "u.get_result()",
            "serialize()",
        ),
    }
}

fn fill(template: &str, sketch: &SketchPayload) -> String {
    template
        .replace("{cpp}", sketch.sketch.cpp_name())
        .replace("{struct}", sketch.struct_name)
        .replace("{k}", sketch.sketch.k_native())
}

impl SourceBuilder {
    pub fn new(config: GeneratorConfig) -> Self {
        Self {
            config,
            aggregates: vec![],
            type_helpers: vec![],
            functions: vec![],
            loaders: vec![],
            loader_names: vec![],
        }
    }

    /// Add everything one sketch contributes to the file
    pub fn add_sketch(&mut self, sketch: &SketchPayload) {
        self.add_aggregate_support(sketch);
        self.add_type_helper(sketch);
        self.add_function_definitions(sketch);
        self.add_loader(sketch);
    }

    /// Bind data, state, operation structs, and aggregate factories
    fn add_aggregate_support(&mut self, sketch: &SketchPayload) {
        let counting = sketch.sketch.category() == SketchCategory::Counting;

        let mut parts = vec![fill(BIND_DATA_TEMPLATE, sketch)];

        if counting {
            let (union_type, lg, result, serialize) = counting_union(sketch.sketch);
            parts.push(fill(COUNTING_STATE_TEMPLATE, sketch));
            parts.push(
                fill(COUNTING_OPERATIONS_TEMPLATE, sketch)
                    .replace("{union}", union_type)
                    .replace("{lg}", lg)
                    .replace("{result}", result)
                    .replace("{serialize}", serialize),
            );
            parts.push(fill(COUNTING_FACTORIES_TEMPLATE, sketch));
        } else {
            parts.push(fill(TYPED_STATE_TEMPLATE, sketch));
            parts.push(fill(TYPED_FACTORIES_TEMPLATE, sketch));
        }

        self.aggregates.push(parts.join("\n\n"));
    }

    /// The helper registering the BLOB-aliased sketch type with the catalog
    fn add_type_helper(&mut self, sketch: &SketchPayload) {
        let cpp = sketch.sketch.cpp_name();
        let display = sketch.display_name;

        let helper = if sketch.sketch.category() == SketchCategory::Counting {
            format!(
                r#"static LogicalType Create{cpp}SketchType(DatabaseInstance &instance)
{{
    auto new_type = LogicalType(LogicalTypeId::BLOB);
    auto new_type_name = std::string("sketch_{display}");
    new_type.SetAlias(new_type_name);
    auto type_info = CreateTypeInfo(new_type_name, new_type);
    type_info.temporary = false;
    type_info.internal = true;
    auto &system_catalog = Catalog::GetSystemCatalog(instance);
    auto data = CatalogTransaction::GetSystemTransaction(instance);
    system_catalog.CreateType(data, type_info);
    ExtensionUtil::RegisterCastFunction(instance, LogicalType::BLOB, new_type, DefaultCasts::ReinterpretCast, 1);
    ExtensionUtil::RegisterCastFunction(instance, new_type, LogicalType::BLOB, DefaultCasts::ReinterpretCast, 1);
    return new_type;
}}"#
            )
        } else {
            format!(
                r#"static LogicalType Create{cpp}SketchType(DatabaseInstance &instance, LogicalType embedded_type)
{{
    auto new_type = LogicalType(LogicalTypeId::BLOB);
    auto type_suffix = toLowerCase(embedded_type.ToString());
    auto new_type_name = "sketch_{display}_" + type_suffix;
    new_type.SetAlias(new_type_name);
    auto type_info = CreateTypeInfo(new_type_name, new_type);
    type_info.temporary = false;
    type_info.internal = true;
    auto &system_catalog = Catalog::GetSystemCatalog(instance);
    auto data = CatalogTransaction::GetSystemTransaction(instance);
    system_catalog.CreateType(data, type_info);
    ExtensionUtil::RegisterCastFunction(instance, LogicalType::BLOB, new_type, DefaultCasts::ReinterpretCast, 1);
    ExtensionUtil::RegisterCastFunction(instance, new_type, LogicalType::BLOB, DefaultCasts::ReinterpretCast, 1);
    return new_type;
}}"#
            )
        };

        self.type_helpers.push(helper);
    }

    /// One specialized static function per (operation, element type)
    fn add_function_definitions(&mut self, sketch: &SketchPayload) {
        for function in &sketch.functions {
            for variant in &function.variants {
                let symbol = function_symbol(sketch.sketch, function.name, variant.element_type);

                let vector_refs = function
                    .argument_names
                    .iter()
                    .enumerate()
                    .map(|(i, name)| format!("    auto &{}_vector = args.data[{}];", name, i))
                    .collect::<Vec<_>>()
                    .join("\n");

                self.functions.push(format!(
                    "static inline void {symbol}(DataChunk &args, ExpressionState &state, Vector &result)\n\
                     {{\n\
                     \x20   D_ASSERT(args.ColumnCount() == {arity});\n\
                     \n\
                     {vector_refs}\n\
                     \n\
                     {block}\n\
                     }}",
                    arity = function.arity,
                    block = indent(&variant.invocation_block, 4),
                ));
            }
        }
    }

    fn scalar_set_block(&self, sketch: &SketchPayload, function: &FunctionPayload) -> String {
        let set_name = format!(
            "{}_{}_{}",
            self.config.function_prefix, sketch.display_name, function.name
        );

        let mut block = format!("\n    {{\n        ScalarFunctionSet fs(\"{set_name}\");\n");
        for variant in &function.variants {
            let symbol = function_symbol(sketch.sketch, function.name, variant.element_type);
            block.push_str(&format!(
                "        fs.AddFunction(ScalarFunction(\n            {}, {}));\n",
                variant.registration_args, symbol
            ));
        }

        let example = format!("{}({})", set_name, function.argument_names.join(", "));
        block.push_str(&format!(
            "\n        CreateScalarFunctionInfo info(std::move(fs));\n\
             \n\
             \x20       {{\n\
             \x20           FunctionDescription desc;\n\
             \x20           desc.description = \"{description}\";\n\
             \x20           desc.examples.push_back(\"{example}\");\n\
             \x20           info.descriptions.push_back(desc);\n\
             \x20       }}\n\
             \n\
             \x20       system_catalog.CreateFunction(data, info);\n\
             \x20   }}\n",
            description = function.description,
        ));
        block
    }

    /// Registration of the creation aggregate set; for the counting
    /// algorithms this is create-only, with merging split into its own
    /// `_union` set over the single handle type.
    fn aggregate_set_blocks(&self, sketch: &SketchPayload) -> String {
        let cpp = sketch.sketch.cpp_name();
        let display = sketch.display_name;
        let counting = sketch.sketch.category() == SketchCategory::Counting;
        let set_name = format!("{}_{}", self.config.function_prefix, display);

        let mut block = format!("\n    {{\n        AggregateFunctionSet sketch(\"{set_name}\");\n");

        for elem in &sketch.allowed_types {
            let result = if counting {
                "sketch_type".to_string()
            } else {
                format!("sketch_map_types[{}]", elem.id_name())
            };
            block.push_str(&format!(
                "\n        {{\n\
                 \x20           auto fun = DS{cpp}CreateAggregate<{native}>({sql}, {result});\n\
                 \x20           fun.bind = DS{cpp}Bind;\n\
                 \x20           fun.arguments.insert(fun.arguments.begin(), LogicalType::INTEGER);\n\
                 \x20           sketch.AddFunction(fun);\n\
                 \x20       }}\n",
                native = elem.native(),
                sql = elem.sql_name(),
            ));
            if !counting {
                block.push_str(&format!(
                    "        {{\n\
                     \x20           auto fun = DS{cpp}MergeAggregate<{native}>({sql}, {result});\n\
                     \x20           fun.bind = DS{cpp}Bind;\n\
                     \x20           fun.arguments.insert(fun.arguments.begin(), LogicalType::INTEGER);\n\
                     \x20           sketch.AddFunction(fun);\n\
                     \x20       }}\n",
                    native = elem.native(),
                    sql = elem.sql_name(),
                ));
            }
        }

        block.push_str(&format!(
            "\n        CreateAggregateFunctionInfo sketch_info(sketch);\n\
             \n\
             \x20       {{\n\
             \x20           FunctionDescription desc;\n\
             \x20           desc.description = \"Creates a sketch_{display} data sketch by aggregating values or by aggregating other {cpp} data sketches\";\n\
             \x20           desc.examples.push_back(\"{set_name}(k, data)\");\n\
             \x20           sketch_info.descriptions.push_back(desc);\n\
             \x20       }}\n\
             \n\
             \x20       system_catalog.CreateFunction(data, sketch_info);\n\
             \x20   }}\n",
        ));

        if counting {
            block.push_str(&format!(
                "\n    {{\n\
                 \x20       AggregateFunctionSet sketch(\"{set_name}_union\");\n\
                 \x20       auto fun = DS{cpp}MergeAggregate(sketch_type);\n\
                 \x20       fun.bind = DS{cpp}Bind;\n\
                 \x20       fun.arguments.insert(fun.arguments.begin(), LogicalType::INTEGER);\n\
                 \x20       sketch.AddFunction(fun);\n\
                 \n\
                 \x20       CreateAggregateFunctionInfo sketch_info(sketch);\n\
                 \n\
                 \x20       {{\n\
                 \x20           FunctionDescription desc;\n\
                 \x20           desc.description = \"Creates a sketch_{display} data sketch by aggregating other {cpp} data sketches\";\n\
                 \x20           desc.examples.push_back(\"{set_name}_union(k, data)\");\n\
                 \x20           sketch_info.descriptions.push_back(desc);\n\
                 \x20       }}\n\
                 \n\
                 \x20       system_catalog.CreateFunction(data, sketch_info);\n\
                 \x20   }}\n",
            ));
        }

        block
    }

    /// The per-sketch loader building handle types and registering functions
    fn add_loader(&mut self, sketch: &SketchPayload) {
        let cpp = sketch.sketch.cpp_name();
        let counting = sketch.sketch.category() == SketchCategory::Counting;

        let mut body = String::from(
            "    auto &system_catalog = Catalog::GetSystemCatalog(instance);\n\
             \x20   auto data = CatalogTransaction::GetSystemTransaction(instance);\n\n",
        );

        if counting {
            body.push_str(&format!(
                "    auto sketch_type = Create{cpp}SketchType(instance);\n"
            ));
        } else {
            body.push_str("    std::unordered_map<LogicalTypeId, LogicalType> sketch_map_types;\n");
            for elem in &sketch.allowed_types {
                body.push_str(&format!(
                    "    sketch_map_types.insert({{{id}, Create{cpp}SketchType(instance, LogicalType({id}))}});\n",
                    id = elem.id_name(),
                ));
            }
        }

        for function in &sketch.functions {
            body.push_str(&self.scalar_set_block(sketch, function));
        }

        body.push_str(&self.aggregate_set_blocks(sketch));

        let loader_name = format!("Load{cpp}Sketch");
        self.loaders.push(format!(
            "void {loader_name}(DatabaseInstance &instance)\n{{\n{body}}}"
        ));
        self.loader_names.push(loader_name);
    }

    /// Assemble the final translation unit
    pub fn finish(self) -> String {
        let mut out = String::new();

        out.push_str(&format!("// {}\n\n", self.config.banner));
        out.push_str(
            "#include \"datasketches_extension.hpp\"\n\
             \n\
             #include \"duckdb/parser/parsed_data/create_scalar_function_info.hpp\"\n\
             #include \"duckdb/parser/parsed_data/create_aggregate_function_info.hpp\"\n\
             #include \"duckdb/function/scalar_function.hpp\"\n\
             #include \"duckdb/main/extension_util.hpp\"\n\
             \n\
             #include <DataSketches/quantiles_sketch.hpp>\n\
             #include <DataSketches/kll_sketch.hpp>\n\
             #include <DataSketches/req_sketch.hpp>\n\
             #include <DataSketches/tdigest.hpp>\n\
             #include <DataSketches/hll.hpp>\n\
             #include <DataSketches/cpc_sketch.hpp>\n\
             #include <DataSketches/cpc_union.hpp>\n\
             \n\
             #include <algorithm>\n\
             #include <unordered_map>\n\n",
        );

        out.push_str(&format!(
            "using namespace duckdb;\nnamespace {}\n{{\n\n",
            self.config.namespace
        ));

        out.push_str(
            "static std::string toLowerCase(const std::string &input)\n\
             {\n\
             \x20   std::string result = input;\n\
             \x20   std::transform(result.begin(), result.end(), result.begin(), [](unsigned char c)\n\
             \x20                  { return std::tolower(c); });\n\
             \x20   return result;\n\
             }\n\n",
        );

        out.push_str(OPERATION_BASE);
        out.push_str("\n\n");
        out.push_str(GENERIC_OPERATIONS);
        out.push_str("\n\n");

        for section in [
            &self.aggregates,
            &self.type_helpers,
            &self.functions,
            &self.loaders,
        ] {
            for item in section {
                out.push_str(item);
                out.push_str("\n\n");
            }
        }

        out.push_str("void LoadSketchFunctions(DatabaseInstance &instance)\n{\n");
        for loader in &self.loader_names {
            out.push_str(&format!("    {}(instance);\n", loader));
        }
        out.push_str("}\n\n");

        out.push_str(&format!("}} // namespace {}\n", self.config.namespace));
        out
    }
}

/// Render a complete payload with the given naming configuration
pub fn render_source(payload: &GenerationPayload, config: &GeneratorConfig) -> String {
    let mut builder = SourceBuilder::new(config.clone());
    for sketch in &payload.sketches {
        builder.add_sketch(sketch);
    }
    builder.finish()
}
