//! Built-in templates
//!
//! Ready-made C initializer templates covering each layout. Presets are
//! looked up by name, e.g. from a project file's `preset_template` field.

/// A named built-in template
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Preset {
    pub name: &'static str,
    pub description: &'static str,
    pub template: &'static str,
}

const PRESETS: &[Preset] = &[
    Preset {
        name: "array-init",
        description: "One-dimensional array, one value per row",
        template: ARRAY_INIT,
    },
    Preset {
        name: "weight-table-simple",
        description: "Assignment statement per row",
        template: WEIGHT_TABLE_SIMPLE,
    },
    Preset {
        name: "array-2d",
        description: "Two-dimensional array, row by row",
        template: ARRAY_2D,
    },
    Preset {
        name: "array-2d-column",
        description: "Two-dimensional array, column by column",
        template: ARRAY_2D_COLUMN,
    },
    Preset {
        name: "array-3d",
        description: "Three-dimensional array, one plane per file",
        template: ARRAY_3D,
    },
    Preset {
        name: "array-3d-column",
        description: "Three-dimensional array per file, column by column",
        template: ARRAY_3D_COLUMN,
    },
    Preset {
        name: "array-4d-range-first",
        description: "Four-dimensional array indexed [range][file][row][col]",
        template: ARRAY_4D_RANGE_FIRST,
    },
    Preset {
        name: "array-4d-column",
        description: "Four-dimensional array, range first, column by column",
        template: ARRAY_4D_COLUMN,
    },
    Preset {
        name: "array-4d-file-first",
        description: "Four-dimensional array indexed [file][range][row][col]",
        template: ARRAY_4D_FILE_FIRST,
    },
    Preset {
        name: "array-3d-multi-range",
        description: "Flattened per-file, per-range buffers",
        template: ARRAY_3D_MULTI_RANGE,
    },
    Preset {
        name: "weight-table",
        description: "Assignments keyed by the first four columns",
        template: WEIGHT_TABLE,
    },
    Preset {
        name: "weight-table-column",
        description: "Per-column weight arrays",
        template: WEIGHT_TABLE_COLUMN,
    },
    Preset {
        name: "multi-range",
        description: "Two arrays from the first two selected ranges",
        template: MULTI_RANGE,
    },
    Preset {
        name: "named-ranges",
        description: "Arrays from the named ranges left_top and right_top",
        template: NAMED_RANGES,
    },
];

/// All presets, in display order
pub fn all() -> &'static [Preset] {
    PRESETS
}

/// Look up a preset by name
pub fn get(name: &str) -> Option<&'static Preset> {
    PRESETS.iter().find(|p| p.name == name)
}

/// Preset names, in display order
pub fn names() -> impl Iterator<Item = &'static str> {
    PRESETS.iter().map(|p| p.name)
}

const ARRAY_INIT: &str = "// One-dimensional array
#define MAX_SIZE 100

unsigned int weights[MAX_SIZE] = {
{{LOOP_START}}
    {{VALUE}},  // index {{ROW_INDEX}}
{{LOOP_END}}
};";

const WEIGHT_TABLE_SIMPLE: &str = "// Simple weight table
void initWeights() {
{{LOOP_START}}
    // weight [row {{ROW_INDEX}}]: {{VALUE}}
    weights[{{ROW_INDEX}}] = {{VALUE}};
{{LOOP_END}}
}";

const ARRAY_2D: &str = "// Two-dimensional array
#define ROW_COUNT {{ROW_COUNT}}
#define COL_COUNT {{COL_COUNT}}

unsigned int table[ROW_COUNT][COL_COUNT] = {
{{LOOP_START}}
    { {{ALL_COLUMNS}} },
{{LOOP_END}}
};";

const ARRAY_2D_COLUMN: &str = "// Two-dimensional array, column by column
{{DIRECTION:COLUMN}}
#define ROW_COUNT {{COL_COUNT}}
#define COL_COUNT {{ROW_COUNT}}

unsigned int table[ROW_COUNT][COL_COUNT] = {
{{LOOP_START}}
    { {{ALL_ROWS}} },  // column {{COL_INDEX}}
{{LOOP_END}}
};";

const ARRAY_3D: &str = "// Three-dimensional array
#define FILE_COUNT {{FILE_COUNT}}
#define ROW_COUNT {{ROW_COUNT}}
#define COL_COUNT {{COL_COUNT}}

unsigned int data3d[FILE_COUNT][ROW_COUNT][COL_COUNT] = {
{{FILES_LOOP_START}}
    // file: {{FILE_NAME}}
    {
{{LOOP_START}}
        { {{ALL_COLUMNS}} },
{{LOOP_END}}
    },
{{FILES_LOOP_END}}
};";

const ARRAY_3D_COLUMN: &str = "// Three-dimensional array, column by column
{{DIRECTION:COLUMN}}
#define FILE_COUNT {{FILE_COUNT}}
#define ROW_COUNT {{COL_COUNT}}
#define COL_COUNT {{ROW_COUNT}}

unsigned int data3d[FILE_COUNT][ROW_COUNT][COL_COUNT] = {
{{FILES_LOOP_START}}
    // file: {{FILE_NAME}}
    {
{{LOOP_START}}
        { {{ALL_ROWS}} },  // column {{COL_INDEX}}
{{LOOP_END}}
    },
{{FILES_LOOP_END}}
};";

const ARRAY_4D_RANGE_FIRST: &str = "// Four-dimensional array [range][file][row][col]
#define RANGE_COUNT {{RANGE_COUNT}}
#define FILE_COUNT {{FILE_COUNT}}
#define ROW_COUNT {{MAX_ROW_COUNT}}
#define COL_COUNT {{MAX_COL_COUNT}}

unsigned int range_dimensions[RANGE_COUNT][2] = {
{{RANGES_LOOP_START}}
    { {{RANGE_ROW_COUNT}}, {{RANGE_COL_COUNT}} },  // range {{RANGE_INDEX}}: {{RANGE_STR}}
{{RANGES_LOOP_END}}
};

unsigned int data4d[RANGE_COUNT][FILE_COUNT][ROW_COUNT][COL_COUNT] = {
{{RANGES_LOOP_START}}
    // range {{RANGE_INDEX}}: {{RANGE_STR}}
    {
{{FILES_LOOP_START}}
        // file: {{FILE_NAME}}
        {
{{RANGE_LOOP_START}}
            { {{ALL_COLUMNS}} },
{{RANGE_LOOP_END}}
        },
{{FILES_LOOP_END}}
    },
{{RANGES_LOOP_END}}
};

unsigned int get_value(unsigned int range_idx, unsigned int file_idx, unsigned int row, unsigned int col) {
    if (range_idx >= RANGE_COUNT || file_idx >= FILE_COUNT ||
        row >= range_dimensions[range_idx][0] || col >= range_dimensions[range_idx][1]) {
        return 0;
    }
    return data4d[range_idx][file_idx][row][col];
}";

const ARRAY_4D_COLUMN: &str = "// Four-dimensional array [range][file][col][row]
{{DIRECTION:COLUMN}}
#define RANGE_COUNT {{RANGE_COUNT}}
#define FILE_COUNT {{FILE_COUNT}}
#define ROW_COUNT {{MAX_COL_COUNT}}
#define COL_COUNT {{MAX_ROW_COUNT}}

unsigned int range_dimensions[RANGE_COUNT][2] = {
{{RANGES_LOOP_START}}
    { {{RANGE_COL_COUNT}}, {{RANGE_ROW_COUNT}} },  // range {{RANGE_INDEX}}: {{RANGE_STR}}
{{RANGES_LOOP_END}}
};

unsigned int data4d[RANGE_COUNT][FILE_COUNT][ROW_COUNT][COL_COUNT] = {
{{RANGES_LOOP_START}}
    // range {{RANGE_INDEX}}: {{RANGE_STR}}
    {
{{FILES_LOOP_START}}
        // file: {{FILE_NAME}}
        {
{{RANGE_LOOP_START}}
            { {{ALL_ROWS}} },  // column {{COL_INDEX}}
{{RANGE_LOOP_END}}
        },
{{FILES_LOOP_END}}
    },
{{RANGES_LOOP_END}}
};";

const ARRAY_4D_FILE_FIRST: &str = "// Four-dimensional array [file][range][row][col]
#define FILE_COUNT {{FILE_COUNT}}
#define RANGE_COUNT {{RANGE_COUNT}}
#define ROW_COUNT {{MAX_ROW_COUNT}}
#define COL_COUNT {{MAX_COL_COUNT}}

unsigned int range_dimensions[RANGE_COUNT][2] = {
{{RANGES_LOOP_START}}
    { {{RANGE_ROW_COUNT}}, {{RANGE_COL_COUNT}} },  // range {{RANGE_INDEX}}: {{RANGE_STR}}
{{RANGES_LOOP_END}}
};

unsigned int data4d[FILE_COUNT][RANGE_COUNT][ROW_COUNT][COL_COUNT] = {
{{FILES_LOOP_START}}
    // file: {{FILE_NAME}}
    {
{{RANGES_LOOP_START}}
        // range {{RANGE_INDEX}}: {{RANGE_STR}}
        {
{{RANGE_LOOP_START}}
            { {{ALL_COLUMNS}} },
{{RANGE_LOOP_END}}
        },
{{RANGES_LOOP_END}}
    },
{{FILES_LOOP_END}}
};";

const ARRAY_3D_MULTI_RANGE: &str = "// Per-file, per-range buffers
#define FILE_COUNT {{FILE_COUNT}}
#define RANGE_COUNT {{RANGE_COUNT}}
#define MAX_ROW_COUNT {{MAX_ROW_COUNT}}
#define MAX_COL_COUNT {{MAX_COL_COUNT}}

unsigned int range_dimensions[RANGE_COUNT][2] = {
{{RANGES_LOOP_START}}
    { {{RANGE_ROW_COUNT}}, {{RANGE_COL_COUNT}} },  // range {{RANGE_INDEX}}: {{RANGE_STR}}
{{RANGES_LOOP_END}}
};

unsigned int* data3d_multi[FILE_COUNT][RANGE_COUNT];

void init_3d_multi_array() {
{{FILES_LOOP_START}}
    // file {{FILE_INDEX}}: {{FILE_NAME}}
{{RANGES_LOOP_START}}
    // range {{RANGE_INDEX}}: {{RANGE_STR}}
    data3d_multi[{{FILE_INDEX}}][{{RANGE_INDEX}}] = malloc({{RANGE_ROW_COUNT}} * {{RANGE_COL_COUNT}} * sizeof(unsigned int));
    {
        unsigned int temp_data[] = {
{{RANGE_DATA_LOOP_START}}
            {{ALL_COLUMNS}},
{{RANGE_DATA_LOOP_END}}
        };
        memcpy(data3d_multi[{{FILE_INDEX}}][{{RANGE_INDEX}}], temp_data, sizeof(temp_data));
    }
{{RANGES_LOOP_END}}
{{FILES_LOOP_END}}
}";

const WEIGHT_TABLE: &str = "// Weight table
void initVariableWeights() {
{{LOOP_START}}
    normal_table_weight[{{COL:0}}][{{COL:1}}][{{COL:2}}][{{COL:3}}] = {{VALUE}};
{{LOOP_END}}
}";

const WEIGHT_TABLE_COLUMN: &str = "// Weight table, column by column
{{DIRECTION:COLUMN}}
void initVariableWeightsByColumn() {
{{LOOP_START}}
    // weights of column {{COL_INDEX}}
    int column_{{COL_INDEX}}_weights[] = { {{ALL_ROWS}} };
    for (int i = 0; i < sizeof(column_{{COL_INDEX}}_weights) / sizeof(int); i++) {
        column_weights[{{COL_INDEX}}][i] = column_{{COL_INDEX}}_weights[i];
    }
{{LOOP_END}}
}";

const MULTI_RANGE: &str = "// Multiple ranges
#define RANGE_1_ROW_COUNT {{RANGE_1_ROW_COUNT}}
#define RANGE_1_COL_COUNT {{RANGE_1_COL_COUNT}}
#define RANGE_2_ROW_COUNT {{RANGE_2_ROW_COUNT}}
#define RANGE_2_COL_COUNT {{RANGE_2_COL_COUNT}}

unsigned int first_area[RANGE_1_ROW_COUNT][RANGE_1_COL_COUNT] = {
{{RANGE:1_LOOP_START}}
    { {{ALL_COLUMNS}} },  // row {{ROW_INDEX}}
{{RANGE:1_LOOP_END}}
};

unsigned int second_area[RANGE_2_ROW_COUNT][RANGE_2_COL_COUNT] = {
{{RANGE:2_LOOP_START}}
    { {{ALL_COLUMNS}} },  // row {{ROW_INDEX}}
{{RANGE:2_LOOP_END}}
};";

const NAMED_RANGES: &str = "// Named ranges
#define LEFT_TOP_ROWS {{RANGE[left_top]_ROW_COUNT}}
#define LEFT_TOP_COLS {{RANGE[left_top]_COL_COUNT}}
#define RIGHT_TOP_ROWS {{RANGE[right_top]_ROW_COUNT}}
#define RIGHT_TOP_COLS {{RANGE[right_top]_COL_COUNT}}

// {{RANGE[left_top]_FULL_NAME}}
unsigned int left_top_area[LEFT_TOP_ROWS][LEFT_TOP_COLS] = {
{{RANGE[left_top]_LOOP_START}}
    { {{ALL_COLUMNS}} },  // row {{ROW_INDEX}}
{{RANGE[left_top]_LOOP_END}}
};

// {{RANGE[right_top]_FULL_NAME}}
unsigned int right_top_area[RIGHT_TOP_ROWS][RIGHT_TOP_COLS] = {
{{RANGE[right_top]_LOOP_START}}
    { {{ALL_COLUMNS}} },  // row {{ROW_INDEX}}
{{RANGE[right_top]_LOOP_END}}
};

int left_top_first_value = {{RANGE[left_top]_VALUE[0,0]}};
int right_top_first_value = {{RANGE[right_top]_VALUE[0,0]}};
";
